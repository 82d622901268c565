diesel::table! {
    branches (id) {
        id -> Int8,
        name -> Text,
        location -> Nullable<Text>,
    }
}

diesel::table! {
    users (id) {
        id -> Int8,
        name -> Text,
        email -> Text,
        role -> Text,
        branch_id -> Nullable<Int8>,
    }
}

diesel::table! {
    groups (id) {
        id -> Int8,
        branch_id -> Nullable<Int8>,
        name -> Text,
        #[sql_name = "type"]
        type_ -> Nullable<Text>,
        description -> Nullable<Text>,
        meeting_url -> Nullable<Text>,
    }
}

diesel::table! {
    group_members (user_id, group_id) {
        user_id -> Int8,
        group_id -> Int8,
        role_in_group -> Nullable<Text>,
    }
}

diesel::table! {
    messages (id) {
        id -> Int8,
        group_id -> Int8,
        sender_id -> Int8,
        content -> Text,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(users -> branches (branch_id));
diesel::joinable!(groups -> branches (branch_id));
diesel::joinable!(group_members -> users (user_id));
diesel::joinable!(group_members -> groups (group_id));
diesel::joinable!(messages -> users (sender_id));
diesel::joinable!(messages -> groups (group_id));

diesel::allow_tables_to_appear_in_same_query!(branches, users, groups, group_members, messages);
