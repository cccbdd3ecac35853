use criterion::{black_box, criterion_group, criterion_main, Criterion};

use quizengine_core::answers::AnswerTracker;
use quizengine_core::model::Question;
use quizengine_core::review::{derive_review, derive_review_from_indices};
use quizengine_core::traits::QuestionOutcome;

fn make_questions(n: usize) -> Vec<Question> {
    (0..n)
        .map(|position| Question {
            text: format!("Question {}", position + 1),
            options: vec![
                "alpha".into(),
                "beta".into(),
                "gamma".into(),
                "delta".into(),
            ],
            position,
        })
        .collect()
}

fn make_answers(n: usize) -> Vec<Option<usize>> {
    (0..n)
        .map(|i| if i % 5 == 0 { None } else { Some(i % 4) })
        .collect()
}

fn bench_derive_review(c: &mut Criterion) {
    let mut group = c.benchmark_group("derive_review");

    for n in [10usize, 50] {
        let questions = make_questions(n);
        let answers = make_answers(n);
        let outcomes: Vec<QuestionOutcome> = (0..n)
            .map(|i| QuestionOutcome {
                correct_index: i % 3,
                explanation: Some(format!("Explanation for question {}", i + 1)),
                suggested_next_steps: vec!["Re-read the explanation.".into()],
            })
            .collect();
        let indices: Vec<usize> = (0..n).map(|i| i % 3).collect();

        group.bench_function(format!("outcomes,n={n}"), |b| {
            b.iter(|| {
                derive_review(
                    black_box(&questions),
                    black_box(&outcomes),
                    black_box(&answers),
                )
            })
        });

        group.bench_function(format!("indices,n={n}"), |b| {
            b.iter(|| {
                derive_review_from_indices(
                    black_box(&questions),
                    black_box(&indices),
                    black_box(&answers),
                )
            })
        });
    }

    group.finish();
}

fn bench_answer_tracker(c: &mut Criterion) {
    c.bench_function("answer_tracker_fill_and_snapshot_50", |b| {
        b.iter(|| {
            let mut tracker = AnswerTracker::new(50);
            for position in 0..50 {
                tracker.set(black_box(position), black_box(position % 4));
                tracker.set(black_box(position), black_box((position + 1) % 4));
            }
            black_box(tracker.snapshot())
        })
    });
}

criterion_group!(benches, bench_derive_review, bench_answer_tracker);
criterion_main!(benches);
