//! Error context extension tests

use rsm_domain::error::Error;
use rsm_infrastructure::ErrorContext;

fn io_failure() -> std::result::Result<(), std::io::Error> {
    Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"))
}

#[test]
fn test_context_maps_to_internal() {
    let err = io_failure().context("reading fixture").unwrap_err();
    assert_eq!(err, Error::internal("reading fixture: gone"));
}

#[test]
fn test_with_context_is_lazy() {
    assert!(Ok::<_, std::io::Error>(1).with_context(|| -> String { unreachable!() }).is_ok());
    let err = io_failure().with_context(|| format!("step {}", 2)).unwrap_err();
    assert_eq!(err, Error::internal("step 2: gone"));
}

#[test]
fn test_io_and_config_context() {
    assert!(matches!(
        io_failure().io_context("writing").unwrap_err(),
        Error::Io { .. }
    ));
    assert!(matches!(
        io_failure().config_context("loading").unwrap_err(),
        Error::Config { .. }
    ));
}
