use std::sync::Once;

use httperr::{ErrorFactory, FactoryError};

static INIT: Once = Once::new();

fn install() {
    INIT.call_once(|| {
        let factory = ErrorFactory::new()
            .with_capture_caller(true)
            .with_path_rewrite(|path| path.replace('\\', "/").trim_start_matches("crates/integration-tests/").to_owned());
        ErrorFactory::install_global(factory).unwrap();
    });
}

#[test]
fn crate_functions_use_installed_factory() {
    install();

    let line = line!() + 1;
    let err = httperr::new("captured");

    assert_eq!(err.file, "tests/global.rs");
    assert_eq!(err.line, line);
    assert_eq!(err.status_code, 400);
}

#[test]
fn second_install_is_rejected() {
    install();

    assert!(matches!(
        ErrorFactory::install_global(ErrorFactory::new()),
        Err(FactoryError::AlreadyInstalled)
    ));
}

#[test]
fn wrapped_foreign_errors_record_the_wrapping_site() {
    install();

    let line = line!() + 1;
    let err = httperr::wrap(std::io::Error::other("disk full"));

    assert_eq!(err.message, "disk full");
    assert_eq!(err.file, "tests/global.rs");
    assert_eq!(err.line, line);
}

#[test]
fn exceptions_and_shared_errors() {
    install();

    let exception = httperr::new_exception("unexpected");
    assert!(exception.exception);

    let shared = httperr::new_shared("guarded");
    shared.add_extra("attempt", 3);
    assert_eq!(shared.extra_value("attempt"), Some(serde_json::json!(3)));
    assert!(httperr::is_wrapped(&shared));
}
