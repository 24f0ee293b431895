//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are
//! used by Diesel for compile-time query validation and type-safe SQL
//! generation. When migrations change the schema, regenerate with
//! `diesel print-schema` or update by hand.

diesel::table! {
    /// User accounts: owners and friends.
    users (id) {
        /// Primary key: UUID v4.
        id -> Uuid,
        /// Display name shown to other users.
        display_name -> Varchar,
        /// `owner` or `friend`; immutable after creation.
        role -> Varchar,
        /// Dialable phone number for notifications.
        phone_number -> Nullable<Varchar>,
        /// Profile photo location.
        profile_photo_url -> Nullable<Varchar>,
        /// Free-text address.
        address_text -> Nullable<Text>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Pups cared for through the scheduling workflows.
    pups (id) {
        /// Primary key: UUID v4.
        id -> Uuid,
        /// The pup's name.
        name -> Varchar,
        /// Owning user.
        owner_user_id -> Uuid,
        /// Care instructions for sitters.
        care_instructions -> Nullable<Text>,
        /// Profile photo location.
        profile_photo_url -> Nullable<Varchar>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Friend-to-pup links; the authorization backbone.
    pup_friendships (id) {
        /// Primary key: UUID v4.
        id -> Uuid,
        /// The linked pup.
        pup_id -> Uuid,
        /// The linked friend user. Unique together with `pup_id`.
        friend_user_id -> Uuid,
        /// Free-text history the friend has with the pup.
        history_with_pup -> Nullable<Text>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Scheduled care slots.
    hangouts (id) {
        /// Primary key: UUID v4.
        id -> Uuid,
        /// The pup the slot cares for.
        pup_id -> Uuid,
        /// Window start.
        start_at -> Timestamptz,
        /// Window end.
        end_at -> Timestamptz,
        /// `open`, `assigned`, `completed`, or `cancelled`.
        status -> Varchar,
        /// Attached friend while status is `assigned`.
        assigned_friend_user_id -> Nullable<Uuid>,
        /// Owner who created the slot.
        created_by_owner_id -> Uuid,
        /// Notes from the owner.
        owner_notes -> Nullable<Text>,
        /// Custom event name for calendars and messages.
        event_name -> Nullable<Varchar>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Friend-proposed hangout times awaiting an owner decision.
    hangout_suggestions (id) {
        /// Primary key: UUID v4.
        id -> Uuid,
        /// The pup the proposal is for.
        pup_id -> Uuid,
        /// The proposing friend.
        suggested_by_friend_user_id -> Uuid,
        /// Proposed window start.
        start_at -> Timestamptz,
        /// Proposed window end.
        end_at -> Timestamptz,
        /// Comment shown to the owner.
        friend_comment -> Nullable<Text>,
        /// `pending`, `approved`, or `rejected`.
        status -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Yes/no replies to open invites, unique per (hangout, responder).
    hangout_responses (id) {
        /// Primary key: UUID v4.
        id -> Uuid,
        /// The hangout replied to.
        hangout_id -> Uuid,
        /// The replying friend. Unique together with `hangout_id`.
        responder_user_id -> Uuid,
        /// `yes` or `no`.
        answer -> Varchar,
        /// When the latest reply was recorded.
        responded_at -> Timestamptz,
    }
}

diesel::table! {
    /// Ordered note log per hangout.
    hangout_notes (id) {
        /// Primary key: UUID v4.
        id -> Uuid,
        /// The hangout the note belongs to.
        hangout_id -> Uuid,
        /// Who wrote the note.
        author_user_id -> Uuid,
        /// The note body.
        note_text -> Text,
        /// When the note was written.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Login tokens, stored as digests only.
    login_tokens (digest) {
        /// Primary key: hex SHA-256 digest of the secret.
        digest -> Varchar,
        /// The user the token authenticates as.
        user_id -> Uuid,
        /// Post-login redirect destination.
        destination -> Nullable<Varchar>,
        /// When the token was issued.
        issued_at -> Timestamptz,
        /// Hard expiry, when time-bounded.
        expires_at -> Nullable<Timestamptz>,
        /// Whether the first redemption consumes the token.
        single_use -> Bool,
        /// Last redemption time; consumption marker for single-use tokens.
        consumed_at -> Nullable<Timestamptz>,
    }
}

diesel::joinable!(pups -> users (owner_user_id));
diesel::joinable!(pup_friendships -> pups (pup_id));
diesel::joinable!(hangouts -> pups (pup_id));
diesel::joinable!(hangout_suggestions -> pups (pup_id));
diesel::joinable!(hangout_responses -> hangouts (hangout_id));
diesel::joinable!(hangout_notes -> hangouts (hangout_id));
diesel::joinable!(login_tokens -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    pups,
    pup_friendships,
    hangouts,
    hangout_suggestions,
    hangout_responses,
    hangout_notes,
    login_tokens,
);
