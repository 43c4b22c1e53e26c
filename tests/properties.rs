use matmul::compare::first_mismatch;
use matmul::{MatmulConfig, MatmulError, Matrix, Tolerance, VectorIsa, multiply_with};
use proptest::prelude::*;

// Entries in [-10, 10] with k < 40 keep every |sum| below 4000, so
// reordered summation drifts well under 1e-9.
const TOL: Tolerance = Tolerance::new(1e-9, 1e-9);

fn matrix(rows: usize, cols: usize) -> impl Strategy<Value = Matrix> {
    proptest::collection::vec(-10.0f64..10.0, rows * cols)
        .prop_map(move |data| Matrix::new(rows, cols, data).unwrap())
}

fn operands() -> impl Strategy<Value = (Matrix, Matrix)> {
    (1usize..40, 1usize..40, 1usize..40)
        .prop_flat_map(|(m, k, n)| (matrix(m, k), matrix(k, n)))
}

fn configs() -> impl Strategy<Value = MatmulConfig> {
    (
        1usize..17,
        1usize..13,
        1usize..7,
        prop_oneof![Just(VectorIsa::Portable4), Just(VectorIsa::Portable8)],
    )
        .prop_map(|(block, threshold, workers, isa)| {
            MatmulConfig::default()
                .with_block_size(block)
                .with_dc_threshold(threshold)
                .with_workers(workers)
                .with_vector_isa(isa)
        })
}

proptest! {
    #[test]
    fn every_strategy_matches_reference((a, b) in operands(), config in configs()) {
        let expected = multiply_with(matmul::Strategy::Reference, &a, &b, &config).unwrap();
        for strategy in matmul::Strategy::ALL {
            let actual = multiply_with(strategy, &a, &b, &config).unwrap();
            prop_assert_eq!(actual.shape(), expected.shape());
            let mismatch = first_mismatch(&expected, &actual, TOL);
            prop_assert!(mismatch.is_none(), "{}: {:?}", strategy, mismatch);
        }
    }

    #[test]
    fn identity_is_neutral(a in (1usize..30, 1usize..30).prop_flat_map(|(m, n)| matrix(m, n)), config in configs()) {
        let left = Matrix::identity(a.rows());
        let right = Matrix::identity(a.cols());
        for strategy in matmul::Strategy::ALL {
            prop_assert_eq!(&multiply_with(strategy, &left, &a, &config).unwrap(), &a);
            prop_assert_eq!(&multiply_with(strategy, &a, &right, &config).unwrap(), &a);
        }
    }

    #[test]
    fn mismatched_inner_dimension_always_fails(
        m in 1usize..20,
        k in 1usize..20,
        extra in 1usize..20,
        n in 1usize..20,
        config in configs(),
    ) {
        let a = Matrix::zeros(m, k);
        let b = Matrix::zeros(k + extra, n);
        for strategy in matmul::Strategy::ALL {
            prop_assert_eq!(
                multiply_with(strategy, &a, &b, &config),
                Err(MatmulError::IncompatibleDimensions {
                    a_rows: m,
                    a_cols: k,
                    b_rows: k + extra,
                    b_cols: n,
                })
            );
        }
    }
}
