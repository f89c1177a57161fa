//! Invariants checked over many generated inputs.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use csv_chart::data::downsample::{compute_stride, sampled_rows};
use csv_chart::data::loader::{run_load, CancelToken, LoadOutcome, LoadRequest};
use csv_chart::data::nearest::nearest_point;
use csv_chart::Point;

use crate::helpers::{columns, load_now, CsvBuilder};

/// Linear scan with the same threshold and tie rule as the indexed search.
fn brute_force_nearest(points: &[Point], x0: f64, threshold: f64) -> Option<Point> {
    let mut best: Option<(f64, Point)> = None;
    for p in points {
        let d = (p.x - x0).abs();
        if d >= threshold {
            continue;
        }
        if best.map_or(true, |(bd, _)| d < bd) {
            best = Some((d, *p));
        }
    }
    best.map(|(_, p)| p)
}

fn sorted_points(rng: &mut StdRng, n: usize, integer_steps: bool) -> Vec<Point> {
    let mut x = rng.gen_range(-50.0..50.0_f64).floor();
    (0..n)
        .map(|_| {
            x += if integer_steps {
                rng.gen_range(1..4) as f64
            } else {
                rng.gen_range(0.01..5.0)
            };
            Point::new(x, rng.gen_range(-100.0..100.0))
        })
        .collect()
}

#[test]
fn indexed_search_matches_linear_scan() {
    let mut rng = StdRng::seed_from_u64(7);
    for round in 0..400 {
        let n = rng.gen_range(0..60);
        let integer_steps = round % 2 == 0;
        let points = sorted_points(&mut rng, n, integer_steps);
        let threshold = rng.gen_range(0.1..20.0);

        for _ in 0..50 {
            // Half-integer queries on integer grids produce exact ties.
            let x0 = if integer_steps {
                rng.gen_range(-80..280) as f64 / 2.0
            } else {
                rng.gen_range(-80.0..280.0)
            };
            assert_eq!(
                nearest_point(&points, x0, threshold),
                brute_force_nearest(&points, x0, threshold),
                "round {round}, x0 = {x0}, threshold = {threshold}, points = {points:?}"
            );
        }
    }
}

#[test]
fn stride_is_positive_and_sampling_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..2000 {
        let total = rng.gen_range(0..1_000_000);
        let budget = rng.gen_range(1..20_000);
        let stride = compute_stride(total, budget);
        assert!(stride >= 1);
        assert_eq!(stride, (total / budget).max(1));

        let a: Vec<usize> = sampled_rows(total.min(5000), stride).collect();
        let b: Vec<usize> = sampled_rows(total.min(5000), stride).collect();
        assert_eq!(a, b);
        assert!(a.windows(2).all(|w| w[1] - w[0] == stride));
    }
}

#[test]
fn loaded_points_are_strictly_increasing_in_x() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut builder = CsvBuilder::new(&["a", "b", "c"]);
    for _ in 0..3000 {
        let cell = |rng: &mut StdRng| {
            if rng.gen_bool(0.1) {
                "x".to_string()
            } else {
                format!("{:.3}", rng.gen_range(-1e3..1e3))
            }
        };
        let (a, b, c) = (cell(&mut rng), cell(&mut rng), cell(&mut rng));
        builder = builder.row(&[a.as_str(), b.as_str(), c.as_str()]);
    }
    let file = builder.write();

    for budget in [1, 7, 100, 999, 5000] {
        let request =
            LoadRequest::new(file.path(), columns(&[("a", 0), ("b", 1), ("c", 2)])).with_max_points(budget);
        let store = load_now(&request);
        for series in store.iter() {
            assert!(
                series.points.windows(2).all(|w| w[0].x < w[1].x),
                "budget {budget}, series {}",
                series.name()
            );
        }
    }
}

#[test]
fn cancelling_at_any_point_yields_nothing() {
    let file = CsvBuilder::numeric(2, 2000).write();
    let request = LoadRequest::new(file.path(), columns(&[("c0", 0), ("c1", 1)])).with_max_points(200);

    for cancel_after in 0..20 {
        let token = CancelToken::new();
        let mut reports = 0;
        let outcome = run_load(&request, &token, |_| {
            reports += 1;
            if reports > cancel_after {
                token.cancel();
            }
        })
        .unwrap();
        assert!(
            matches!(outcome, LoadOutcome::Cancelled),
            "cancel after {cancel_after} reports"
        );
    }
}

#[test]
fn progress_never_decreases() {
    let file = CsvBuilder::numeric(1, 7777).write();
    for budget in [1, 3, 50, 7777, 100_000] {
        let request = LoadRequest::new(file.path(), columns(&[("c0", 0)])).with_max_points(budget);
        let mut seen = Vec::new();
        let outcome = run_load(&request, &CancelToken::new(), |p| seen.push(p)).unwrap();
        assert!(matches!(outcome, LoadOutcome::Completed(_)));
        assert!(seen.windows(2).all(|w| w[0] <= w[1]), "budget {budget}: {seen:?}");
        assert_eq!(seen.last(), Some(&100));
    }
}
