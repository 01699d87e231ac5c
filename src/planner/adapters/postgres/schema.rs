//! Diesel schema for planner persistence.

diesel::table! {
    /// Sections owned by users.
    sections (id) {
        /// Section identifier.
        id -> Uuid,
        /// Owning user.
        user_id -> Uuid,
        /// Display name.
        #[max_length = 255]
        name -> Varchar,
        /// Color token.
        #[max_length = 50]
        color -> Nullable<Varchar>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Tasks owned by users, optionally filed under a section.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning user.
        user_id -> Uuid,
        /// Section reference, not enforced as a foreign key.
        section_id -> Nullable<Uuid>,
        /// Title.
        title -> Text,
        /// Description.
        description -> Nullable<Text>,
        /// Priority wire value.
        #[max_length = 20]
        priority -> Varchar,
        /// Status wire value.
        #[max_length = 20]
        status -> Varchar,
        /// Scheduled calendar date.
        date -> Nullable<Date>,
        /// Scheduled time of day.
        time -> Nullable<Time>,
        /// Ordered tags.
        tags -> Nullable<Array<Text>>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
