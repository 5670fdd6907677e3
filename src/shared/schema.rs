diesel::table! {
    accounts (id) {
        id -> Uuid,
        email -> Text,
        employee_code -> Text,
        display_name -> Text,
        password_hash -> Text,
        state -> Nullable<Text>,
        role_id -> Nullable<Uuid>,
        role_name -> Nullable<Text>,
        granted_sections -> Jsonb,
        approved_at -> Nullable<Timestamptz>,
        approved_by -> Nullable<Uuid>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    risk_roles (id) {
        id -> Uuid,
        name -> Text,
        description -> Text,
        default_sections -> Jsonb,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    risks (id) {
        id -> Uuid,
        code -> Text,
        title -> Text,
        description -> Text,
        category -> Text,
        status -> Text,
        likelihood -> Nullable<Numeric>,
        impact -> Nullable<Numeric>,
        score -> Nullable<Numeric>,
        risk_level -> Nullable<Text>,
        severity -> Nullable<Text>,
        assessment_notes -> Nullable<Text>,
        treatment_plan -> Nullable<Text>,
        review_date -> Nullable<Date>,
        owner_id -> Nullable<Uuid>,
        reporter_id -> Nullable<Uuid>,
        evaluated_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(accounts, risk_roles, risks);
