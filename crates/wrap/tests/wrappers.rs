use micro_wrap::{
    Allow, Debounce, Deprecate, Function, IdentityWrapper, Invocation, WarningSink, Warnings, Wrapper, Wrappers,
    methodize, once, promisify, suppress_warnings,
};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default, Clone)]
struct RecordingSink {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingSink {
    fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl WarningSink for RecordingSink {
    fn warn(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_owned());
    }
}

fn counter() -> (Function, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    let counted = Arc::clone(&count);
    let f = Function::from_args(move |_| json!(counted.fetch_add(1, Ordering::SeqCst) + 1));
    (f, count)
}

#[test]
fn chained_wrappers_share_one_channel() {
    let sink = RecordingSink::default();
    let warnings = Warnings::new(sink.clone());

    let wrappers: Wrappers<IdentityWrapper, IdentityWrapper, Function> = Wrappers::default();
    let wrappers = wrappers
        .and_then(Allow::new(1).warnings(warnings.clone()))
        .and_then(Deprecate::new().message("use v2").warnings(warnings.clone()));

    let (f, count) = counter();
    let f = wrappers.wrap(f);

    assert_eq!(f.invoke([]).unwrap().into_value(), Some(json!(1)));
    assert!(f.invoke([]).unwrap().is_unit());
    assert_eq!(count.load(Ordering::SeqCst), 1);

    assert_eq!(
        sink.messages(),
        vec![
            "use v2".to_owned(),
            "use v2".to_owned(),
            "This function should not be called more than 1 times.".to_owned(),
        ]
    );

    let quiet = suppress_warnings(&warnings, f);
    quiet.invoke([]).unwrap();
    assert_eq!(sink.messages().len(), 3);
}

#[test]
fn once_equals_allow_one() {
    let (f, _) = counter();
    let (g, _) = counter();
    let once_f = once(f);
    let allow_g = Allow::new(1).warnings(Warnings::builder().silent().build()).wrap(g);

    for _ in 0..3 {
        let left = once_f.invoke([]).unwrap().into_value();
        let right = allow_g.invoke([]).unwrap().into_value();
        assert_eq!(left, right);
    }
}

#[test]
fn methodize_reads_the_receiver() {
    let add = Function::from_args(|args| json!(args[0]["x"].as_i64().unwrap_or(0) + args[1].as_i64().unwrap_or(0)));
    let bar = methodize(Vec::<String>::new(), add);

    let foo = Arc::new(json!({"x": 1}));
    let output = bar.call(Invocation::new(vec![json!(2)]).on(foo)).unwrap();
    assert_eq!(output.into_value(), Some(json!(3)));
}

#[tokio::test(start_paused = true)]
async fn promisified_echo_resolves_to_a_list() {
    let echo = promisify(|invocation, callback| {
        let x = invocation.arg(0).cloned().unwrap_or(Value::Null);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            callback.call(Value::Null, vec![x]);
        });
        Ok(())
    });

    let result = echo.invoke([json!(10)]).unwrap().settle().await.unwrap();
    assert_eq!(result, Some(json!([10])));
}

#[tokio::test(start_paused = true)]
async fn debounced_once_fires_a_single_time_across_bursts() {
    let (f, count) = counter();
    let f = Debounce::new(Duration::from_millis(50)).wrap(once(f));

    for _ in 0..3 {
        f.invoke([]).unwrap();
        f.invoke([]).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    assert_eq!(count.load(Ordering::SeqCst), 1);
    // the later bursts ran into the exhausted `once`
    assert!(f.invoke([]).unwrap().is_unit());
}
