use micro_decorate::{Class, DecorateError, Object, Registry};
use micro_wrap::{Function, Output, WrapError};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

fn counter() -> Function {
    Function::new(|invocation| {
        let this = invocation.receiver_as::<Object>().ok_or_else(|| WrapError::missing_receiver("counter"))?;
        let clicks = this.with_fields(|fields| {
            let clicks = fields.get("clicks").and_then(Value::as_i64).unwrap_or_default() + 1;
            fields.insert("clicks".to_owned(), json!(clicks));
            clicks
        });
        info!(clicks, "clicked");
        Ok(Output::Value(json!(clicks)))
    })
}

fn button(registry: &Registry) -> Result<Arc<Class>, DecorateError> {
    Class::builder("Button")
        .method("click", counter())
        .method("init", Function::from_args(|_| json!("initialized")))
        .method("legacy_click", counter())
        .decorator("click", registry.decorator("debounce")?.configure(vec![json!(50)]))
        .decorator("init", registry.decorator("once")?)
        .decorator("legacy_click", registry.decorator("deprecate")?.configure(vec![json!("use click")]))
        .build()
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let registry = Registry::new();
    let class = match button(&registry) {
        Ok(class) => class,
        Err(e) => {
            error!(cause = %e, "failed to define class");
            return;
        }
    };

    let button = class.new_object();
    for key in ["init", "init", "click", "click", "click", "legacy_click"] {
        if let Err(e) = button.invoke(key, vec![]) {
            error!(key, cause = %e, "call failed");
        }
    }

    tokio::time::sleep(Duration::from_millis(100)).await;
    info!(clicks = ?button.field("clicks"), "done");
}
