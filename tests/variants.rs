//! Behavior of the regularized and truncated CG variants on indefinite
//! operators, plus the shared-tolerance wiring.

use cgkit::core::wrappers::EuclideanProduct;
use cgkit::error::CgError;
use cgkit::preconditioner::Identity;
use cgkit::solver::{make_cg, make_rcg, make_tcg, make_trcg};
use cgkit::termination::{ResidualBased, TerminationCriterion};
use cgkit::utils::convergence::StopReason;
use faer::Mat;

fn indefinite() -> Mat<f64> {
    // diag(1, −1)
    Mat::from_fn(2, 2, |i, j| {
        if i == j {
            if i == 0 {
                1.0
            } else {
                -1.0
            }
        } else {
            0.0
        }
    })
}

fn negative_definite() -> Mat<f64> {
    Mat::from_fn(2, 2, |i, j| if i == j { -1.0 } else { 0.0 })
}

#[test]
fn rcg_shifts_through_vanishing_curvature() {
    let a = indefinite();
    let p = Identity;
    let sp = EuclideanProduct;
    let mut rcg = make_rcg::<_, _, _, ResidualBased<f64>, _>(&a, &p, &sp, 1e-8, 5, 0, 1e-15);
    let mut x = vec![1.0, 1.0];
    let mut b = vec![0.0, 0.0];

    // the first search direction has ⟨δx, A·δx⟩ = 0; the shift restores it
    let stats = rcg.apply(&mut x, &mut b).unwrap();

    let shift = stats.regularization_shift.expect("rcg records its shift");
    assert!(shift > 0.0);
    assert_eq!(stats.reason, StopReason::MaxIterations);
}

#[test]
fn rcg_rejects_curvature_it_cannot_restore() {
    let a = negative_definite();
    let p = Identity;
    let sp = EuclideanProduct;
    let mut rcg = make_rcg::<_, _, _, ResidualBased<f64>, _>(&a, &p, &sp, 1e-8, 10, 0, 1e-15);
    let mut x = vec![1.0, 1.0];
    let mut b = vec![0.0, 0.0];

    let err = rcg.apply(&mut x, &mut b).unwrap_err();
    assert!(matches!(err, CgError::InvalidOperator(_)));
}

#[test]
fn tcg_truncates_on_nonpositive_curvature() {
    let a = indefinite();
    let p = Identity;
    let sp = EuclideanProduct;
    let mut tcg = make_tcg::<_, _, _, ResidualBased<f64>, _>(&a, &p, &sp, 1e-8, 10, 0, 1e-15);
    let mut x = vec![1.0, 1.0];
    let mut b = vec![0.0, 0.0];

    let stats = tcg.apply(&mut x, &mut b).unwrap();

    assert_eq!(stats.reason, StopReason::Truncated);
    assert_eq!(stats.iterations, 1);
    // the step was rejected before the iterate update
    assert_eq!(x, vec![1.0, 1.0]);
}

#[test]
fn trcg_regularizes_weak_curvature_instead_of_truncating() {
    let a = indefinite();
    let p = Identity;
    let sp = EuclideanProduct;
    let mut trcg = make_trcg::<_, _, _, ResidualBased<f64>, _>(&a, &p, &sp, 1e-8, 3, 0, 1e-15);
    let mut x = vec![1.0, 1.0];
    let mut b = vec![0.0, 0.0];

    let stats = trcg.apply(&mut x, &mut b).unwrap();

    // vanishing curvature is repaired, not truncated
    assert_ne!(stats.reason, StopReason::Truncated);
    assert!(stats.regularization_shift.unwrap() > 0.0);
}

#[test]
fn trcg_truncates_strongly_negative_curvature() {
    let a = negative_definite();
    let p = Identity;
    let sp = EuclideanProduct;
    let mut trcg = make_trcg::<_, _, _, ResidualBased<f64>, _>(&a, &p, &sp, 1e-8, 10, 0, 1e-15);
    let mut x = vec![1.0, 1.0];
    let mut b = vec![0.0, 0.0];

    let stats = trcg.apply(&mut x, &mut b).unwrap();

    assert_eq!(stats.reason, StopReason::Truncated);
    assert_eq!(x, vec![1.0, 1.0]);
    assert!(stats.regularization_shift.unwrap() > 0.0);
}

#[test]
fn plain_cg_reports_no_shift() {
    let a = Mat::from_fn(2, 2, |i, j| [[4.0, 1.0], [1.0, 3.0]][i][j]);
    let p = Identity;
    let sp = EuclideanProduct;
    let mut cg = make_cg::<_, _, _, ResidualBased<f64>, _>(&a, &p, &sp, 1e-12, 10, 0, 1e-15);
    let mut x = vec![0.0, 0.0];
    let mut b = vec![1.0, 2.0];

    let stats = cg.apply(&mut x, &mut b).unwrap();

    assert!(stats.converged());
    assert!(stats.regularization_shift.is_none());
}

#[test]
fn eps_propagates_across_driver_step_and_criterion() {
    let a = indefinite();
    let p = Identity;
    let sp = EuclideanProduct;
    let cg = make_cg::<_, _, _, ResidualBased<f64>, _>(&a, &p, &sp, 1e-8, 10, 0, 1e-15);

    cg.set_eps(1e-9);
    assert_eq!(cg.eps.get(), 1e-9);
    assert_eq!(cg.step.eps.get(), 1e-9);
    assert_eq!(cg.step.preconditioning.eps.get(), 1e-9);
    assert_eq!(cg.step.search.eps.get(), 1e-9);
    assert_eq!(cg.termination.eps.get(), 1e-9);

    // setting from any connected node reaches every peer
    cg.termination.eps.set(1e-7);
    assert_eq!(cg.eps.get(), 1e-7);
    assert_eq!(cg.step.preconditioning.eps.get(), 1e-7);
}

#[test]
fn accuracies_are_shared_between_driver_and_criterion() {
    let a = indefinite();
    let p = Identity;
    let sp = EuclideanProduct;
    let cg = make_cg::<_, _, _, ResidualBased<f64>, _>(&a, &p, &sp, 1e-8, 10, 0, 1e-15);

    // make_cg put the requested accuracy on the criterion; the driver
    // adopted it through the connection
    assert_eq!(cg.relative_accuracy.get(), 1e-8);
    assert_eq!(cg.termination.relative_accuracy().get(), 1e-8);

    cg.set_absolute_accuracy(1e-11);
    assert_eq!(cg.termination.absolute_accuracy().get(), 1e-11);
    cg.set_max_steps(42);
    assert_eq!(cg.termination.max_steps().get(), 42);
}