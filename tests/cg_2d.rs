//! Conjugate gradient steps on the 2×2 example from
//! https://en.wikipedia.org/wiki/Conjugate_gradient_method#Numerical_example
//!
//! A = [[4, 1], [1, 3]], b = [1, 2], x₀ = [2, 1], so the initial residual is
//! b − A·x₀ = [−8, −3]. The right-hand-side buffer doubles as the residual
//! carrier, which these tests pin down step by step.

use approx::assert_abs_diff_eq;
use cgkit::core::wrappers::EuclideanProduct;
use cgkit::preconditioner::Identity;
use cgkit::solver::{make_cg, make_tcg};
use cgkit::termination::ResidualBased;
use cgkit::utils::convergence::StopReason;
use faer::Mat;

fn system() -> Mat<f64> {
    Mat::from_fn(2, 2, |i, j| [[4.0, 1.0], [1.0, 3.0]][i][j])
}

fn initial_guess() -> Vec<f64> {
    vec![2.0, 1.0]
}

fn right_hand_side() -> Vec<f64> {
    vec![1.0, 2.0]
}

#[test]
fn no_step_leaves_the_initial_residual_in_b() {
    let a = system();
    let p = Identity;
    let sp = EuclideanProduct;
    let mut cg = make_tcg::<_, _, _, ResidualBased<f64>, _>(&a, &p, &sp, 1e-15, 0, 0, 1e-15);
    let mut x = initial_guess();
    let mut b = right_hand_side();

    let stats = cg.apply(&mut x, &mut b).unwrap();

    assert_eq!(b, vec![-8.0, -3.0]);
    assert_eq!(x, vec![2.0, 1.0]);
    assert_eq!(stats.reason, StopReason::MaxIterations);
    assert_eq!(stats.iterations, 0);
}

#[test]
fn one_step_scales_the_steepest_descent_direction() {
    let a = system();
    let p = Identity;
    let sp = EuclideanProduct;
    let mut cg = make_tcg::<_, _, _, ResidualBased<f64>, _>(&a, &p, &sp, 1e-15, 1, 0, 1e-15);
    let mut x = initial_guess();
    let mut b = right_hand_side();

    cg.apply(&mut x, &mut b).unwrap();

    let alpha = 73.0 / 331.0;
    assert_abs_diff_eq!(b[0], -8.0 + alpha * 35.0, epsilon = 1e-14);
    assert_abs_diff_eq!(b[1], -3.0 + alpha * 17.0, epsilon = 1e-14);
    assert_abs_diff_eq!(x[0], 2.0 + alpha * -8.0, epsilon = 1e-14);
    assert_abs_diff_eq!(x[1], 1.0 + alpha * -3.0, epsilon = 1e-14);
}

#[test]
fn two_steps_reach_the_exact_solution() {
    let a = system();
    let p = Identity;
    let sp = EuclideanProduct;
    let mut cg = make_tcg::<_, _, _, ResidualBased<f64>, _>(&a, &p, &sp, 1e-15, 2, 0, 1e-15);
    let mut x = initial_guess();
    let mut b = right_hand_side();

    cg.apply(&mut x, &mut b).unwrap();

    assert_abs_diff_eq!(x[0], 0.09090909090909091, epsilon = 1e-12);
    assert_abs_diff_eq!(x[1], 0.6363636363636364, epsilon = 1e-12);
}

#[test]
fn residual_based_convergence_within_two_steps() {
    let a = system();
    let p = Identity;
    let sp = EuclideanProduct;
    let mut cg = make_cg::<_, _, _, ResidualBased<f64>, _>(&a, &p, &sp, 1e-15, 10, 0, 1e-15);
    cg.set_absolute_accuracy(1e-10);
    let mut x = initial_guess();
    let mut b = right_hand_side();

    let stats = cg.apply(&mut x, &mut b).unwrap();

    assert_eq!(stats.reason, StopReason::Converged);
    assert!(stats.iterations <= 2);
    assert!(stats.final_residual <= 1e-10);
    assert_abs_diff_eq!(x[0], 1.0 / 11.0, epsilon = 1e-10);
    assert_abs_diff_eq!(x[1], 7.0 / 11.0, epsilon = 1e-10);
}

#[test]
fn zero_initial_residual_converges_without_stepping() {
    let a = system();
    let p = Identity;
    let sp = EuclideanProduct;
    let mut cg = make_cg::<_, _, _, ResidualBased<f64>, _>(&a, &p, &sp, 1e-15, 10, 0, 1e-15);
    cg.set_absolute_accuracy(1e-10);
    // b = A·x₀, so the initial residual vanishes
    let mut x = vec![2.0, 1.0];
    let mut b = vec![9.0, 5.0];

    let stats = cg.apply(&mut x, &mut b).unwrap();

    assert_eq!(stats.reason, StopReason::Converged);
    assert_eq!(stats.iterations, 0);
    assert_eq!(x, vec![2.0, 1.0]);
}

#[test]
fn residual_carrier_stays_coherent_with_the_iterate() {
    let a = system();
    let p = Identity;
    let sp = EuclideanProduct;
    let mut cg = make_cg::<_, _, _, ResidualBased<f64>, _>(&a, &p, &sp, 1e-15, 10, 0, 1e-15);
    cg.set_absolute_accuracy(1e-10);
    let mut x = initial_guess();
    let mut b = right_hand_side();
    let b0 = b.clone();

    cg.apply(&mut x, &mut b).unwrap();

    // b now carries r = b₀ − A·x, recomputable from the final iterate
    let mut ax = vec![0.0; 2];
    use cgkit::core::traits::LinearOperator;
    a.apply(&x, &mut ax);
    for i in 0..2 {
        assert_abs_diff_eq!(b[i], b0[i] - ax[i], epsilon = 1e-10);
    }
}

#[test]
fn energy_error_is_nonincreasing() {
    use cgkit::core::traits::LinearOperator;

    // A = [[4,1,0],[1,3,1],[0,1,2]], x_true = [1,2,3], b = A·x_true
    let a = Mat::from_fn(3, 3, |i, j| {
        [[4.0, 1.0, 0.0], [1.0, 3.0, 1.0], [0.0, 1.0, 2.0]][i][j]
    });
    let x_true = vec![1.0, 2.0, 3.0];
    let b = {
        let mut b = vec![0.0; 3];
        a.apply(&x_true, &mut b);
        b
    };
    let p = Identity;
    let sp = EuclideanProduct;

    let energy = |x: &Vec<f64>| {
        let e: Vec<f64> = x_true.iter().zip(x.iter()).map(|(t, xi)| t - xi).collect();
        let mut ae = vec![0.0; 3];
        a.apply(&e, &mut ae);
        e.iter().zip(ae.iter()).map(|(ei, aei)| ei * aei).sum::<f64>()
    };

    let mut previous = f64::INFINITY;
    for steps in 0..4 {
        let mut cg =
            make_cg::<_, _, _, ResidualBased<f64>, _>(&a, &p, &sp, 1e-15, steps, 0, 1e-15);
        let mut x = vec![0.0; 3];
        let mut r = b.clone();
        cg.apply(&mut x, &mut r).unwrap();
        let current = energy(&x);
        assert!(
            current <= previous + 1e-12,
            "energy grew at step {steps}: {current} > {previous}"
        );
        previous = current;
    }
    // finite termination: dim(domain) steps reach the exact solution
    assert!(previous <= 1e-20);
}

#[test]
fn monitor_and_history_observe_every_iteration() {
    use std::cell::RefCell;
    use std::rc::Rc;

    let a = system();
    let p = Identity;
    let sp = EuclideanProduct;
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let mut cg = make_cg::<_, _, _, ResidualBased<f64>, _>(&a, &p, &sp, 1e-15, 10, 0, 1e-15)
        .with_monitor(move |i, res| sink.borrow_mut().push((i, res)));
    cg.set_absolute_accuracy(1e-10);
    let mut x = initial_guess();
    let mut b = right_hand_side();

    let stats = cg.apply(&mut x, &mut b).unwrap();

    let seen = seen.borrow();
    assert_eq!(seen.len(), stats.iterations + 1);
    assert_eq!(seen[0].0, 0);
    assert_abs_diff_eq!(seen[0].1, 73.0f64.sqrt(), epsilon = 1e-12);
    assert_eq!(cg.residual_history.len(), stats.iterations + 1);
}