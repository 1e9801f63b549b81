use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use ndarray::Array1;
use parlik::{
    Backend, DiagnosticStream, RuntimeExecutor, RuntimeSpecBuilder, parallel_hierarchical_map,
    parallel_hierarchical_reduce, poisson_hierarchical_map, poisson_hierarchical_reduce,
};
use parlik_test::HierarchicalData;

const N_GROUPS: usize = 64;
const N_OBS: usize = 200_000;

fn executors() -> Vec<(&'static str, RuntimeExecutor)> {
    [Backend::Serial, Backend::Threads]
        .into_iter()
        .filter_map(|backend| {
            let executor = RuntimeSpecBuilder::new()
                .backend(backend)
                .build()
                .build_executor()
                .ok()?;
            let name = match backend {
                Backend::Serial => "serial",
                Backend::Threads => "threads",
            };
            Some((name, executor))
        })
        .collect()
}

// how the grain size trades scheduling overhead against load balance
fn bench_reduce_grainsize(c: &mut Criterion) {
    let data = HierarchicalData::from_random(N_GROUPS, N_OBS, 2525365464_u64);
    let log_lambda_group = Array1::from(data.log_lambda_group().to_vec());

    let mut group = c.benchmark_group("hierarchical_reduce");
    group.throughput(Throughput::Elements(N_OBS as u64));
    for (name, executor) in executors() {
        for grainsize in [16usize, 256, 4096, 65536, N_OBS] {
            group.bench_with_input(
                BenchmarkId::new(name, grainsize),
                &grainsize,
                |b, &grainsize| {
                    b.iter(|| {
                        parallel_hierarchical_reduce(
                            &executor,
                            data.y(),
                            log_lambda_group.view(),
                            data.gidx(),
                            grainsize,
                            DiagnosticStream::none(),
                            poisson_hierarchical_reduce,
                        )
                    })
                },
            );
        }
    }
    group.finish();
}

fn bench_map(c: &mut Criterion) {
    let data = HierarchicalData::from_random(N_GROUPS, N_OBS, 2525365464_u64);
    let log_lambda_group = Array1::from(data.log_lambda_group().to_vec());
    let groups: Vec<usize> = (0..N_GROUPS).collect();

    let mut group = c.benchmark_group("hierarchical_map");
    group.throughput(Throughput::Elements(N_OBS as u64));
    for (name, executor) in executors() {
        group.bench_function(name, |b| {
            b.iter(|| {
                parallel_hierarchical_map(
                    &executor,
                    &groups,
                    log_lambda_group.view(),
                    data.yg(),
                    DiagnosticStream::none(),
                    poisson_hierarchical_map,
                )
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_reduce_grainsize, bench_map);
criterion_main!(benches);
