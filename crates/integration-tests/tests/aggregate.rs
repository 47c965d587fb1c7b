use http::StatusCode;
use httperr::{ApiError, BoxError, ErrorFactory, HttpError};

#[derive(Debug, thiserror::Error)]
enum SignupError {
    #[error("email already registered")]
    EmailTaken,
    #[error("mail server unreachable")]
    MailServer,
}

impl HttpError for SignupError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::EmailTaken => StatusCode::CONFLICT,
            Self::MailServer => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::EmailTaken => "email_taken",
            Self::MailServer => "mail_server",
        }
    }

    fn client_message(&self) -> String {
        self.to_string()
    }
}

fn field_error(factory: &ErrorFactory, message: &str) -> ApiError {
    factory.new_with_category(message, "validation").with_title("Invalid field")
}

#[test]
fn validation_report_is_flat_and_unique() {
    let factory = ErrorFactory::new();

    let mut email = factory.new_error("email checks failed");
    email.add([
        field_error(&factory, "email is required"),
        field_error(&factory, "email is malformed"),
    ]);

    let mut profile = factory.new_error("profile checks failed");
    profile.add([
        field_error(&factory, "email is required"),
        field_error(&factory, "name is too long"),
    ]);

    let mut report = factory.new_with_status_code("request validation failed", StatusCode::UNPROCESSABLE_ENTITY);
    report.add([Some(email), None, Some(profile)]);

    let messages: Vec<_> = report.children().iter().map(|c| c.message.as_str()).collect();
    assert_eq!(messages, ["email is required", "email is malformed", "name is too long"]);
    assert!(report.children().iter().all(ApiError::is_empty_children));

    insta::assert_snapshot!(
        report.to_string(),
        @"statusCode=422, message=request validation failed, errs:(category=validation, message=email is required,category=validation, message=email is malformed,category=validation, message=name is too long)"
    );
}

#[test]
fn mixed_error_sources() {
    let factory = ErrorFactory::new();

    let errs: Vec<Option<BoxError>> = vec![
        Some(Box::new(factory.new_error("ours")) as BoxError),
        None,
        Some(Box::new(std::io::Error::other("io failed")) as BoxError),
        Some(Box::new(factory.new_error("ours")) as BoxError),
    ];

    let mut target = factory.new_error("batch failed");
    target.add(errs);

    let messages: Vec<_> = target.children().iter().map(|c| c.message.as_str()).collect();
    assert_eq!(messages, ["ours", "io failed"]);
    assert!(target.children()[0].cause.is_none());
    assert!(target.children()[1].cause.is_some());
}

#[test]
fn domain_errors_convert_with_their_classification() {
    let mut target = ApiError::default();
    target.add([
        ApiError::from_http_error(SignupError::EmailTaken),
        ApiError::from_http_error(SignupError::MailServer),
    ]);

    let taken = &target.children()[0];
    assert_eq!(taken.status_code, 409);
    assert_eq!(taken.code, "email_taken");
    assert!(!taken.exception);

    let mail = &target.children()[1];
    assert_eq!(mail.status_code, 502);
    assert!(mail.exception);
}

#[test]
fn anyhow_context_chain_uses_top_message() {
    let err = anyhow::Error::new(std::io::Error::other("connection reset")).context("loading profile");

    let mut target = ApiError::default();
    target.add([err]);

    assert_eq!(target.children()[0].message, "loading profile");
}

#[test]
fn wrap_of_wrap_keeps_content() {
    let original = ErrorFactory::new()
        .new_with_category("quota exceeded", "billing")
        .with_code("Q-1");

    let once = httperr::wrap(original.clone());
    let twice = httperr::wrap(once.clone());

    assert_eq!(once, original);
    assert_eq!(twice, once);
}

#[test]
fn wrap_of_anyhow_keeps_our_error() {
    let original = ErrorFactory::new()
        .new_with_category("quota exceeded", "billing")
        .with_code("Q-1");

    let wrapped = httperr::wrap(anyhow::Error::new(original.clone()));

    assert_eq!(wrapped, original);
    assert_eq!(wrapped.to_string(), "category=billing, code=Q-1, message=quota exceeded");
}

#[test]
fn shared_error_inside_anyhow_is_added_unchanged() {
    let shared = ErrorFactory::new().new_shared("guarded");
    shared.add_extra("holder", "worker-2");

    let mut target = ApiError::default();
    target.add([anyhow::Error::new(shared)]);

    let child = &target.children()[0];
    assert_eq!(child.message, "guarded");
    assert_eq!(child.extra_value("holder"), Some(&serde_json::json!("worker-2")));
}

#[test]
fn json_round_trip_of_aggregate() {
    let factory = ErrorFactory::new();
    let mut report = factory.new_exception("import failed").with_extra("rows", 120);
    report.add([
        factory.new_with_category("row 3: bad date", "parse"),
        factory.new_with_category("row 9: bad amount", "parse"),
    ]);

    let decoded = ApiError::from_json(&report.to_json()).unwrap();

    assert_eq!(decoded, report);
}
