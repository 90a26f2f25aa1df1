use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Callback taking one borrowed argument: lifecycle hooks and widget callbacks alike
pub type Handler<A> = Arc<dyn Fn(&A) + Send + Sync>;

/// Chain `extension` after `previous`.
///
/// The previous handler always runs first. A missing previous handler is not
/// an error; the extension simply becomes the handler. A panic in either
/// handler is caught and logged, and does not stop the other one.
pub fn compose<A: ?Sized + 'static>(
    previous: Option<Handler<A>>,
    extension: Handler<A>,
) -> Handler<A> {
    match previous {
        None => Arc::new(move |arg: &A| run_isolated(&extension, arg, "extension")),
        Some(previous) => Arc::new(move |arg: &A| {
            run_isolated(&previous, arg, "previous");
            run_isolated(&extension, arg, "extension");
        }),
    }
}

fn run_isolated<A: ?Sized>(handler: &Handler<A>, arg: &A, role: &str) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| handler(arg))) {
        tracing::error!(handler = role, reason = %panic_reason(payload.as_ref()), "Handler panicked");
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_previous_runs_before_extension() {
        let log = Arc::new(Mutex::new(Vec::new()));

        let first = log.clone();
        let previous: Handler<str> = Arc::new(move |v: &str| first.lock().push(format!("prev:{v}")));
        let second = log.clone();
        let extension: Handler<str> = Arc::new(move |v: &str| second.lock().push(format!("ext:{v}")));

        let chained = compose(Some(previous), extension);
        chained("x");

        assert_eq!(*log.lock(), vec!["prev:x".to_string(), "ext:x".to_string()]);
    }

    #[test]
    fn test_missing_previous_is_passthrough() {
        let hits = Arc::new(Mutex::new(0));
        let counter = hits.clone();
        let extension: Handler<u32> = Arc::new(move |n: &u32| *counter.lock() += *n);

        let chained = compose(None, extension);
        chained(&3);
        chained(&4);

        assert_eq!(*hits.lock(), 7);
    }

    #[test]
    fn test_composition_nests() {
        let log = Arc::new(Mutex::new(String::new()));
        let mut handler: Option<Handler<str>> = None;
        for tag in ["a", "b", "c"] {
            let log = log.clone();
            let extension: Handler<str> = Arc::new(move |_: &str| log.lock().push_str(tag));
            handler = Some(compose(handler, extension));
        }

        if let Some(handler) = handler {
            handler("");
        }
        assert_eq!(log.lock().as_str(), "abc");
    }

    #[test]
    fn test_panicking_previous_does_not_skip_extension() {
        let hits = Arc::new(Mutex::new(Vec::new()));
        let previous: Handler<str> = Arc::new(|_: &str| panic!("host handler broke"));
        let log = hits.clone();
        let extension: Handler<str> = Arc::new(move |v: &str| log.lock().push(v.to_string()));

        let chained = compose(Some(previous), extension);
        chained("a");

        let later = hits.clone();
        let outer: Handler<str> = Arc::new(move |v: &str| later.lock().push(format!("outer:{v}")));
        let panicking: Handler<str> = Arc::new(|_: &str| panic!("extension broke"));
        compose(Some(compose(Some(chained), panicking)), outer)("b");

        assert_eq!(
            *hits.lock(),
            vec!["a".to_string(), "b".to_string(), "outer:b".to_string()]
        );
    }
}
