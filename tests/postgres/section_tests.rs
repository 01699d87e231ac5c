//! Section table behaviour against a real database.

use super::helpers::{PlannerDb, published};
use daybook::identity::UserId;
use daybook::planner::domain::{
    NEUTRAL_HEX, NewSection, Section, SectionColor, SectionId, SectionPatch,
};
use daybook::sync::domain::RowChange;
use daybook::sync::ports::RemoteTable;
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;

#[rstest]
fn insert_returns_the_stored_row(
    shared_test_cluster: &'static TestCluster,
) -> eyre::Result<()> {
    let db = PlannerDb::create(shared_test_cluster)?;
    let owner = UserId::new();

    let created = db.block_on(db.sections.insert(owner, NewSection::new(" Work ")?))?;
    let listed = db.block_on(db.sections.select(owner))?;

    eyre::ensure!(created.user_id() == owner, "owner not stored");
    eyre::ensure!(created.name() == "Work", "name not trimmed");
    eyre::ensure!(created.color() == Some(SectionColor::Blue), "default color lost");
    eyre::ensure!(listed == vec![created], "select disagrees with insert");
    Ok(())
}

#[rstest]
fn select_lists_only_the_owners_rows_oldest_first(
    shared_test_cluster: &'static TestCluster,
) -> eyre::Result<()> {
    let db = PlannerDb::create(shared_test_cluster)?;
    let owner = UserId::new();
    let mut expected = Vec::new();
    for name in ["Work", "Home", "Errands"] {
        expected.push(db.block_on(db.sections.insert(owner, NewSection::new(name)?))?);
    }
    db.block_on(db.sections.insert(UserId::new(), NewSection::new("Foreign")?))?;
    expected.sort_by_key(|section| (section.created_at(), section.id().into_inner()));

    let listed = db.block_on(db.sections.select(owner))?;

    eyre::ensure!(listed == expected, "expected {expected:?}, got {listed:?}");
    Ok(())
}

#[rstest]
fn update_returns_the_patched_row_and_publishes_it(
    shared_test_cluster: &'static TestCluster,
) -> eyre::Result<()> {
    let db = PlannerDb::create(shared_test_cluster)?;
    let owner = UserId::new();
    let created = db.block_on(db.sections.insert(owner, NewSection::new("Work")?))?;
    let mut stream = db.block_on(db.sections.subscribe(owner))?;
    let patch = SectionPatch::new()
        .with_name("Deep work")?
        .with_color(SectionColor::Purple);

    let updated = db
        .block_on(db.sections.update(created.id(), patch))?
        .ok_or_else(|| eyre::eyre!("existing section not updated"))?;

    eyre::ensure!(updated.id() == created.id(), "id changed");
    eyre::ensure!(updated.name() == "Deep work", "name not patched");
    eyre::ensure!(updated.color() == Some(SectionColor::Purple), "color not patched");
    eyre::ensure!(updated.created_at() == created.created_at(), "creation time moved");
    eyre::ensure!(
        published(&mut stream) == vec![RowChange::Update(updated)],
        "update not published"
    );
    Ok(())
}

#[rstest]
fn update_of_a_missing_section_returns_none(
    shared_test_cluster: &'static TestCluster,
) -> eyre::Result<()> {
    let db = PlannerDb::create(shared_test_cluster)?;

    let outcome = db.block_on(
        db.sections
            .update(SectionId::new(), SectionPatch::new().with_name("Ghost")?),
    )?;

    eyre::ensure!(outcome.is_none(), "missing section reported as updated");
    Ok(())
}

#[rstest]
fn delete_publishes_to_the_owner_once(
    shared_test_cluster: &'static TestCluster,
) -> eyre::Result<()> {
    let db = PlannerDb::create(shared_test_cluster)?;
    let owner = UserId::new();
    let created = db.block_on(db.sections.insert(owner, NewSection::new("Work")?))?;
    let mut stream = db.block_on(db.sections.subscribe(owner))?;

    db.block_on(db.sections.delete(created.id()))?;
    db.block_on(db.sections.delete(created.id()))?;

    eyre::ensure!(
        db.block_on(db.sections.select(owner))?.is_empty(),
        "row survived delete"
    );
    eyre::ensure!(
        published(&mut stream) == vec![RowChange::<Section>::Delete { id: created.id() }],
        "expected exactly one delete notification"
    );
    Ok(())
}

#[rstest]
fn rows_with_colors_outside_the_palette_still_load(
    shared_test_cluster: &'static TestCluster,
) -> eyre::Result<()> {
    let db = PlannerDb::create(shared_test_cluster)?;
    let owner = UserId::new();
    db.block_on(db.sections.insert(owner, NewSection::new("Work")?))?;
    db.execute(&format!(
        "INSERT INTO sections (user_id, name, color) VALUES ('{}', 'Legacy', 'bg-indigo-500')",
        owner.into_inner()
    ))?;

    let listed = db.block_on(db.sections.select(owner))?;
    let legacy = listed
        .iter()
        .find(|section| section.name() == "Legacy")
        .ok_or_else(|| eyre::eyre!("legacy section dropped from {listed:?}"))?;

    eyre::ensure!(listed.len() == 2, "expected both sections, got {listed:?}");
    eyre::ensure!(legacy.color().is_none(), "unknown token mapped to a palette color");
    eyre::ensure!(legacy.display_hex() == NEUTRAL_HEX, "legacy section not neutral");
    Ok(())
}
