diesel::table! {
    orders (id) {
        id -> Uuid,
        #[max_length = 256]
        user_name -> Varchar,
        #[max_length = 32]
        phone_number -> Varchar,
        #[max_length = 50]
        status -> Varchar,
        notes -> Nullable<Text>,
        created -> Timestamptz,
    }
}
