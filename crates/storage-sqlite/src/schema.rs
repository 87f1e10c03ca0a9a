// Mirrors the latest layout produced by `db::migrations`. The `holdings` table
// only exists in containers still at schema version 1, and `assets.institutions`
// only from version 2 on.

diesel::table! {
    assets (id) {
        id -> Text,
        name -> Text,
        target_ratio -> Nullable<Integer>,
        institutions -> Text,
        created_at -> Text,
        updated_at -> Text,
    }
}

diesel::table! {
    holdings (id) {
        id -> Text,
        name -> Text,
        code -> Nullable<Text>,
        asset_id -> Text,
        amount -> Text,
        institution_details -> Nullable<Text>,
        created_at -> Text,
        updated_at -> Text,
    }
}

diesel::allow_tables_to_appear_in_same_query!(assets, holdings);
