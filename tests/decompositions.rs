use densela::linalg::{
    svd_in_place_with_max_sweeps, symmetric_eigen_in_place, LinalgError, MAX_SWEEPS,
};
use densela::DenseMatrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const TOL: f64 = 1e-10;

fn random_matrix(rng: &mut StdRng, m: usize, n: usize) -> DenseMatrix<f64> {
    DenseMatrix::from_fn(m, n, |_, _| rng.gen_range(-1.0..1.0))
}

fn random_symmetric(rng: &mut StdRng, n: usize) -> DenseMatrix<f64> {
    let b = random_matrix(rng, n, n);
    DenseMatrix::from_fn(n, n, |i, j| b[(i, j)] + b[(j, i)])
}

fn assert_orthonormal_columns(q: &DenseMatrix<f64>, msg: &str) {
    let qtq = &q.transpose() * q;
    let err = qtq.max_abs_diff(&DenseMatrix::eye(q.ncols()));
    assert!(err < TOL, "{}: columns not orthonormal (err {})", msg, err);
}

#[test]
fn lu_random_square() {
    let mut rng = StdRng::seed_from_u64(7);
    for n in 1..=8 {
        let a = random_matrix(&mut rng, n, n);
        let lu = a.lu();
        let pa = &lu.p() * &a;
        assert!(pa.max_abs_diff(&(&lu.l() * &lu.u())) < TOL, "P·A != L·U for n={}", n);

        let b = random_matrix(&mut rng, n, 3);
        let x = lu.solve(&b).unwrap();
        assert!((&a * &x).max_abs_diff(&b) < 1e-8, "A·X != B for n={}", n);
    }
}

#[test]
fn det_matches_product_rule() {
    let mut rng = StdRng::seed_from_u64(11);
    let a = random_matrix(&mut rng, 5, 5);
    let b = random_matrix(&mut rng, 5, 5);
    let lhs = (&a * &b).det();
    let rhs = a.det() * b.det();
    assert!((lhs - rhs).abs() < TOL * (1.0 + rhs.abs()));
}

#[test]
fn qr_random_shapes() {
    let mut rng = StdRng::seed_from_u64(13);
    for &(m, n) in &[(1, 1), (3, 3), (6, 4), (4, 6), (7, 1), (1, 5)] {
        let a = random_matrix(&mut rng, m, n);
        let qr = a.qr();
        let (q, r, p) = (qr.q(), qr.r(), qr.p());
        assert!((&a * &p).max_abs_diff(&(&q * &r)) < TOL, "A·P != Q·R for {}x{}", m, n);
        assert_orthonormal_columns(&q, "Q");

        let d = qr.diagonal();
        for i in 1..d.len() {
            assert!(d[i].abs() <= d[i - 1].abs() + TOL, "pivoting order for {}x{}", m, n);
        }
    }
}

#[test]
fn lstsq_normal_equations() {
    let mut rng = StdRng::seed_from_u64(17);
    let a = random_matrix(&mut rng, 8, 3);
    let b = random_matrix(&mut rng, 8, 2);
    let x = a.lstsq(&b);
    let mut residual = &a * &x;
    for (r, v) in residual.as_mut_slice().iter_mut().zip(b.as_slice()) {
        *r -= v;
    }
    let atr = &a.transpose() * &residual;
    assert!(atr.max_abs_diff(&DenseMatrix::zeros(3, 2)) < TOL);
}

#[test]
fn svd_random_shapes() {
    let mut rng = StdRng::seed_from_u64(19);
    for &(m, n) in &[(1, 1), (2, 2), (5, 3), (3, 5), (8, 8), (6, 1), (1, 6)] {
        let a = random_matrix(&mut rng, m, n);
        let svd = a.svd().unwrap();
        assert!(svd.reconstruct().max_abs_diff(&a) < TOL, "A != U·S·V^T for {}x{}", m, n);
        assert_orthonormal_columns(svd.u(), "U");
        assert_orthonormal_columns(svd.v(), "V");
        let s = svd.singular_values();
        assert!(s.windows(2).all(|w| w[0] >= w[1]), "not descending: {:?}", s);
        assert!(s.iter().all(|&x| x >= 0.0));
    }
}

#[test]
fn svd_rank_of_low_rank_product() {
    let mut rng = StdRng::seed_from_u64(23);
    let a = &random_matrix(&mut rng, 6, 2) * &random_matrix(&mut rng, 2, 5);
    let svd = a.svd().unwrap();
    assert_eq!(svd.rank_with_tol(1e-10), 2);
    assert!((svd.norm2() - a.norm2().unwrap()).abs() < TOL);
}

#[test]
fn svd_sweep_cap_is_enforced() {
    let mut rng = StdRng::seed_from_u64(29);
    let n = 6;
    let mut a = random_matrix(&mut rng, n, n).into_vec();
    let mut s = vec![0.0; n];
    let mut v = vec![0.0; n * n];
    let err = svd_in_place_with_max_sweeps(n, n, true, &mut a, &mut s, &mut v, 1).unwrap_err();
    assert!(matches!(err, LinalgError::ConvergenceFailure { sweeps: 1, .. }));
}

#[test]
fn svd_nan_input_reports_convergence_failure() {
    let mut a = DenseMatrix::from_rows(3, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 10.0]);
    a[(1, 1)] = f64::NAN;
    let err = a.svd().unwrap_err();
    assert!(matches!(
        err,
        LinalgError::ConvergenceFailure { sweeps: MAX_SWEEPS, .. }
    ));
}

#[test]
fn symmetric_eigen_random() {
    let mut rng = StdRng::seed_from_u64(31);
    for n in 1..=8 {
        let a = random_symmetric(&mut rng, n);
        let eig = a.eig_symmetric().unwrap();
        let (vals, vecs) = (eig.eigenvalues(), eig.eigenvectors());
        let av = &a * vecs;
        let vl = DenseMatrix::from_fn(n, n, |i, j| vecs[(i, j)] * vals[j]);
        assert!(av.max_abs_diff(&vl) < TOL, "A·V != V·Λ for n={}", n);
        assert_orthonormal_columns(vecs, "eigenvectors");
        assert!(vals.windows(2).all(|w| w[0] <= w[1]));
    }
}

#[test]
fn symmetric_eigen_kernel_in_place() {
    let mut rng = StdRng::seed_from_u64(37);
    let a = random_symmetric(&mut rng, 5);
    let mut work = a.clone().into_vec();
    let mut d = vec![0.0; 5];
    symmetric_eigen_in_place(5, &mut work, &mut d).unwrap();

    // Singular values of a symmetric matrix are |eigenvalues|.
    let mut abs_eigs: Vec<f64> = d.iter().map(|x| x.abs()).collect();
    abs_eigs.sort_by(|x, y| y.partial_cmp(x).unwrap());
    let svd = a.svd().unwrap();
    for (x, y) in abs_eigs.iter().zip(svd.singular_values()) {
        assert!((x - y).abs() < TOL);
    }
}
