diesel::table! {
    conversations (id) {
        id -> BigInt,
        user_id -> Text,
        title -> Nullable<Text>,
        is_active -> Bool,
        created_at -> BigInt,
        updated_at -> BigInt,
    }
}

diesel::table! {
    messages (id) {
        id -> BigInt,
        conversation_id -> BigInt,
        role -> Text,
        content -> Text,
        metadata -> Nullable<Text>,
        created_at -> BigInt,
    }
}

diesel::table! {
    feedback (id) {
        id -> BigInt,
        message_id -> BigInt,
        user_id -> Text,
        kind -> Text,
        comment -> Nullable<Text>,
        created_at -> BigInt,
    }
}

diesel::joinable!(messages -> conversations (conversation_id));
diesel::joinable!(feedback -> messages (message_id));

diesel::allow_tables_to_appear_in_same_query!(conversations, messages, feedback);
