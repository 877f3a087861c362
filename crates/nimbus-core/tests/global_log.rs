//! Scenarios against the process-wide log registry.
//!
//! Everything runs inside one test function: the global registry is shared
//! by every test in a binary, and parallel tests would race on it.

use std::sync::{Arc, Mutex};

use nimbus_core::log::{self, Classification, ClassificationFilter, END_OF_LIST, LogCallback};

type Captured = Arc<Mutex<Vec<(Classification, Vec<u8>)>>>;

fn capturing() -> (Arc<LogCallback>, Captured) {
    let captured: Captured = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&captured);
    let callback = LogCallback::new(move |c, msg| sink.lock().unwrap().push((c, msg.to_vec())));
    (Arc::new(callback), captured)
}

#[test]
fn global_registry_scenarios() {
    // Initial state: nothing registered, nothing logs.
    for c in Classification::ALL {
        assert!(!log::should_log(c), "{c}");
        assert!(!log::log(c, b"ignored"));
    }

    // A callback alone opens all ten classifications; the filter slot
    // stays empty.
    let (callback, captured) = capturing();
    log::set_callback(Some(Arc::clone(&callback)));
    for c in Classification::ALL {
        assert!(log::should_log(c), "{c}");
    }
    assert!(nimbus_core::log::LogRegistry::global().classifications().is_none());

    // [REQUEST, RESPONSE, <end>] filter.
    let filter = ClassificationFilter::from_codes(&[
        Classification::HttpRequest.code(),
        Classification::HttpResponse.code(),
        END_OF_LIST,
    ]);
    log::set_classifications(Some(Arc::new(filter)));

    assert!(!log::should_log(Classification::HttpRetry));
    assert!(log::should_log(Classification::HttpRequest));
    assert!(log::log(Classification::HttpRequest, b"HTTP Request : GET /"));
    {
        let captured = captured.lock().unwrap();
        assert_eq!(captured.len(), 1);
        assert_eq!(
            captured[0],
            (Classification::HttpRequest, b"HTTP Request : GET /".to_vec())
        );
    }

    // A filter without a callback logs nothing.
    log::set_callback(None);
    assert!(!log::should_log(Classification::HttpRequest));

    log::set_classifications(None);
    for c in Classification::ALL {
        assert!(!log::should_log(c));
    }
}
