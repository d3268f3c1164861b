use rulinalg::matrix::{BaseMatrix, Matrix};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

#[derive(Serialize, Deserialize)]
struct MatrixBits {
    rows: usize,
    cols: usize,
    bits: Vec<u64>,
}

pub fn serialize_matrix<S: Serializer>(
    matrix: &Matrix<f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    // Convert f64 values to u64 bits for precise serialization
    MatrixBits {
        rows: matrix.rows(),
        cols: matrix.cols(),
        bits: matrix.data().iter().map(|&f| f64::to_bits(f)).collect(),
    }
    .serialize(serializer)
}

pub fn deserialize_matrix<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Matrix<f64>, D::Error> {
    let MatrixBits { rows, cols, bits } = MatrixBits::deserialize(deserializer)?;
    if rows.checked_mul(cols) != Some(bits.len()) {
        return Err(de::Error::invalid_length(
            bits.len(),
            &format!("{rows}x{cols} matrix").as_str(),
        ));
    }

    Ok(Matrix::new(
        rows,
        cols,
        bits.into_iter().map(f64::from_bits).collect::<Vec<_>>(),
    ))
}

pub fn serialize_vec<S: Serializer>(v: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
    v.iter()
        .map(|&f| f64::to_bits(f))
        .collect::<Vec<_>>()
        .serialize(serializer)
}

pub fn deserialize_vec<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
    Vec::<u64>::deserialize(deserializer).map(|v| v.into_iter().map(f64::from_bits).collect())
}
