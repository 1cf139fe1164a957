use criterion::{black_box, criterion_group, criterion_main, Criterion};
use formdraft_editor::FieldReconciler;
use formdraft_schema::{Field, FieldKind};

const KEYS: [&str; 4] = ["text", "email", "number", "select"];

fn fields(prefix: &str, count: u32, label_suffix: &str) -> Vec<Field> {
    (0..count)
        .map(|i| {
            let key = KEYS[i as usize % KEYS.len()];
            Field {
                id: format!("{}{}", prefix, i),
                label: format!("Question {}{}", i, label_suffix),
                description: String::new(),
                required: i % 3 == 0,
                order: i,
                type_id: format!("type-{}", key),
                kind: FieldKind::from_key(key),
            }
        })
        .collect()
}

fn reconcile_exact(c: &mut Criterion) {
    let old = fields("old-", 200, "");
    let new = fields("new-", 200, "");

    c.bench_function("reconcile_exact_last_of_200", |b| {
        b.iter(|| FieldReconciler::reconcile(black_box(&old), black_box("old-199"), black_box(&new)))
    });
}

fn reconcile_relabelled(c: &mut Criterion) {
    let old = fields("old-", 200, "");
    // Every label changed, so the order tier has to do the work
    let new = fields("new-", 200, " (edited)");

    c.bench_function("reconcile_order_tier_of_200", |b| {
        b.iter(|| FieldReconciler::reconcile(black_box(&old), black_box("old-150"), black_box(&new)))
    });
}

fn reconcile_whole_selection(c: &mut Criterion) {
    let old = fields("old-", 50, "");
    let new = fields("new-", 50, "");
    let ids: Vec<String> = old.iter().map(|f| f.id.clone()).collect();

    c.bench_function("reconcile_all_50", |b| {
        b.iter(|| {
            FieldReconciler::reconcile_all(
                black_box(&old),
                ids.iter().map(String::as_str),
                black_box(&new),
            )
        })
    });
}

criterion_group!(
    benches,
    reconcile_exact,
    reconcile_relabelled,
    reconcile_whole_selection
);
criterion_main!(benches);
