pub(crate) use super::*;

#[test]
fn test_from_vec() {
    let m = Matrix::from_vec(2, 3, vec![1.0_f32, 2.0, 3.0, 4.0, 5.0, 6.0])
        .expect("test data has correct dimensions: 2*3=6 elements");
    assert_eq!(m.shape(), (2, 3));
    assert!((m.get(0, 0) - 1.0).abs() < 1e-6);
    assert!((m.get(1, 2) - 6.0).abs() < 1e-6);
}

#[test]
fn test_from_vec_error() {
    let result = Matrix::from_vec(2, 3, vec![1.0_f32, 2.0, 3.0]);
    assert!(result.is_err());
}

#[test]
fn test_from_rows() {
    let rows = vec![[1.0_f32, 2.0], [3.0, 4.0], [5.0, 6.0]];
    let m = Matrix::from_rows(2, &rows).expect("rows are rectangular");
    assert_eq!(m.shape(), (3, 2));
    assert!((m.get(2, 0) - 5.0).abs() < 1e-6);
}

#[test]
fn test_from_rows_ragged() {
    let rows: Vec<Vec<f32>> = vec![vec![1.0, 2.0], vec![3.0]];
    assert!(Matrix::from_rows(2, &rows).is_err());
}

#[test]
fn test_zeros() {
    let m = Matrix::zeros(2, 3);
    assert_eq!(m.shape(), (2, 3));
    assert!(m.as_slice().iter().all(|&x| x == 0.0));
}

#[test]
fn test_row() {
    let m = Matrix::from_vec(2, 3, vec![1.0_f32, 2.0, 3.0, 4.0, 5.0, 6.0])
        .expect("test data has correct dimensions: 2*3=6 elements");
    let row = m.row(1);
    assert_eq!(row.len(), 3);
    assert!((row[0] - 4.0).abs() < 1e-6);
    assert!((row[2] - 6.0).abs() < 1e-6);
    assert_eq!(m.row_slice(0), &[1.0, 2.0, 3.0]);
}

#[test]
fn test_column() {
    let m = Matrix::from_vec(2, 3, vec![1.0_f32, 2.0, 3.0, 4.0, 5.0, 6.0])
        .expect("test data has correct dimensions: 2*3=6 elements");
    let col = m.column(1);
    assert_eq!(col.as_slice(), &[2.0, 5.0]);
}

#[test]
fn test_vstack() {
    let a = Matrix::from_vec(1, 2, vec![1.0_f32, 2.0]).expect("1x2");
    let b = Matrix::from_vec(2, 2, vec![3.0_f32, 4.0, 5.0, 6.0]).expect("2x2");
    let stacked = a.vstack(&b).expect("same width");
    assert_eq!(stacked.shape(), (3, 2));
    assert_eq!(stacked.row_slice(2), &[5.0, 6.0]);

    let c = Matrix::from_vec(1, 3, vec![0.0_f32; 3]).expect("1x3");
    assert!(a.vstack(&c).is_err());
}

#[test]
fn test_column_vector() {
    let m = Matrix::column_vector(vec![10.0, 200.0, 30.0]);
    assert_eq!(m.shape(), (3, 1));
    assert!((m.get(1, 0) - 200.0).abs() < 1e-6);
}
