use bencher::TestCase;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use micro_decorate::{Class, Registry};
use micro_wrap::{Allow, Function, Warnings, Wrapper, multicast, observable, spread};
use serde_json::json;
use std::hint::black_box;
use std::ops::ControlFlow;

fn create_test_cases() -> Vec<TestCase> {
    vec![TestCase::small("small_args"), TestCase::normal("normal_args"), TestCase::large("large_args")]
}

fn identity() -> Function {
    Function::new(|invocation| Ok(invocation.args().first().cloned().into()))
}

fn benchmark_call_overhead(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("call_overhead");

    let wrapped = [
        ("plain", identity()),
        ("allow", Allow::new(usize::MAX).warnings(Warnings::builder().silent().build()).wrap(identity())),
        ("spread", spread(identity())),
        ("observable", {
            let observed = observable(identity());
            observed.set_before(|_| ControlFlow::Continue(()));
            observed.function()
        }),
    ];

    for case in create_test_cases() {
        group.throughput(Throughput::Elements(case.group().arg_count() as u64));
        for (name, f) in &wrapped {
            group.bench_with_input(BenchmarkId::new(*name, case.name()), &case, |b, case| {
                b.iter_batched(|| case.args(), |args| black_box(f.invoke(args)), criterion::BatchSize::SmallInput);
            });
        }
    }

    group.finish();
}

fn benchmark_multicast(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("multicast");
    let f = multicast(identity());

    for case in create_test_cases() {
        group.throughput(Throughput::Elements(case.group().arg_count() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(case.name()), &case, |b, case| {
            b.iter_batched(|| case.array_arg(), |args| black_box(f.invoke(args)), criterion::BatchSize::SmallInput);
        });
    }

    group.finish();
}

fn benchmark_decorated_method(criterion: &mut Criterion) {
    let registry = Registry::new();
    let Ok(bind) = registry.decorator("bind") else {
        return;
    };
    let Ok(class) = Class::builder("Bench").method("get", identity()).decorator("get", bind).build() else {
        return;
    };
    let object = class.new_object();

    criterion.bench_function("bound_method_lookup_and_call", |b| {
        b.iter(|| black_box(object.invoke("get", vec![json!(1)])));
    });
}

criterion_group!(wrappers, benchmark_call_overhead, benchmark_multicast, benchmark_decorated_method);
criterion_main!(wrappers);
