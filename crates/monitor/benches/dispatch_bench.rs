//! 디스패처 벤치마크 -- 라인당 시그니처 매칭 비용 측정

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use authtail_monitor::{ErrorSignature, MatchDispatcher, ResourceType, SignatureRegistry};

fn build_registry() -> SignatureRegistry {
    SignatureRegistry::compile(vec![
        ErrorSignature {
            id: "invalid_credentials".to_owned(),
            pattern: r"invalid credentials email=(?P<email>\S+) ip=(?P<ip>[0-9.]+)".to_owned(),
            notification_key: "email".to_owned(),
            resource_type: ResourceType::Email,
        },
        ErrorSignature {
            id: "invalid_two_factor".to_owned(),
            pattern: r"two-factor code rejected email=(?P<email>\S+) ip=(?P<ip>[0-9.]+)"
                .to_owned(),
            notification_key: "email".to_owned(),
            resource_type: ResourceType::Email,
        },
        ErrorSignature {
            id: "resource_auth_failed".to_owned(),
            pattern: r"resource auth failed resource=(?P<resource>\S+) ip=(?P<ip>[0-9.]+)"
                .to_owned(),
            notification_key: "resource".to_owned(),
            resource_type: ResourceType::Other,
        },
    ])
}

fn bench_dispatch(c: &mut Criterion) {
    let registry = build_registry();

    let matching_first =
        "2024-03-01T10:15:30.000Z invalid credentials email=user@example.com ip=203.0.113.5";
    let matching_last =
        "2024-03-01T10:15:30.000Z resource auth failed resource=intranet ip=203.0.113.5";
    let non_matching =
        "2024-03-01T10:15:30.000Z session refreshed for email=user@example.com from 203.0.113.5";
    let no_timestamp = "plain line without any timestamp prefix at all";

    c.bench_function("dispatch_matching_first_signature", |b| {
        b.iter(|| MatchDispatcher::dispatch(black_box(matching_first), black_box(&registry)))
    });

    c.bench_function("dispatch_matching_last_signature", |b| {
        b.iter(|| MatchDispatcher::dispatch(black_box(matching_last), black_box(&registry)))
    });

    c.bench_function("dispatch_non_matching_line", |b| {
        b.iter(|| MatchDispatcher::dispatch(black_box(non_matching), black_box(&registry)))
    });

    c.bench_function("dispatch_line_without_timestamp", |b| {
        b.iter(|| MatchDispatcher::dispatch(black_box(no_timestamp), black_box(&registry)))
    });
}

criterion_group!(benches, bench_dispatch);
criterion_main!(benches);
