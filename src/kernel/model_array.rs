use crate::domain::{DgDegree, DgField};
use crate::error::DynamicsError;

use std::fmt;

/// Layout of the data in a [ModelArray]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArrayType {
    /// One value per Elem
    H,
    /// All coefficients of a tracer-degree DG field, Elem by Elem
    Dg,
    /// All coefficients of a stress-degree DG field, Elem by Elem
    DgStress,
    /// One value per vertex
    Vertex,
}

impl fmt::Display for ArrayType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            Self::H => "H",
            Self::Dg => "DG",
            Self::DgStress => "DGSTRESS",
            Self::Vertex => "VERTEX",
        };
        write!(f, "{}", label)
    }
}

/// Flat array of model data exchanged with the dynamics kernel
#[derive(Clone, Debug, PartialEq)]
pub struct ModelArray {
    array_type: ArrayType,
    components: usize,
    data: Vec<f64>,
}

impl ModelArray {
    /// One value per Elem
    pub fn h(data: Vec<f64>) -> Self {
        Self {
            array_type: ArrayType::H,
            components: 1,
            data,
        }
    }

    /// One value per vertex
    pub fn vertex(data: Vec<f64>) -> Self {
        Self {
            array_type: ArrayType::Vertex,
            components: 1,
            data,
        }
    }

    /// DG coefficients (`components` per Elem) of either DG array type
    ///
    /// Panics if `array_type` is not a DG type or `data` is not a whole number of rows.
    pub fn dg(array_type: ArrayType, components: usize, data: Vec<f64>) -> Self {
        assert!(
            matches!(array_type, ArrayType::Dg | ArrayType::DgStress),
            "{} is not a DG array type!",
            array_type
        );
        assert!(
            components > 0 && data.len() % components == 0,
            "DG array of length {} cannot be split into rows of {}!",
            data.len(),
            components
        );

        Self {
            array_type,
            components,
            data,
        }
    }

    pub fn array_type(&self) -> ArrayType {
        self.array_type
    }

    /// Number of values per entry (1 unless this is a DG array)
    pub fn components(&self) -> usize {
        self.components
    }

    /// Number of entries (Elems or vertices)
    pub fn len(&self) -> usize {
        self.data.len() / self.components
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.data
    }

    /// The first value of every entry (the mean of a DG array)
    pub fn means(&self) -> impl Iterator<Item = f64> + '_ {
        self.data.chunks(self.components).map(|row| row[0])
    }
}

/// Layout of the fields the kernel knows by name without a prior registration
pub fn field_type(name: &str) -> Option<ArrayType> {
    let array_type = match name {
        "hice" | "cice" | "damage" | "hsnow" | "tice" => ArrayType::Dg,
        "sst" | "sss" => ArrayType::H,
        "s11" | "s12" | "s22" => ArrayType::DgStress,
        "u" | "v" | "uwind" | "vwind" | "uocean" | "vocean" => ArrayType::Vertex,
        _ => return None,
    };
    Some(array_type)
}

/// Fill a DG field from an array
///
/// `Dg` and `DgStress` arrays copy every coefficient, so their component count must match the field. `H` arrays
/// set the element means and zero the higher coefficients.
pub fn ma2dg(name: &str, data: &ModelArray, target: &mut DgField) -> Result<(), DynamicsError> {
    let num_elems = target.element_count();

    match data.array_type {
        ArrayType::H => {
            check_length(name, num_elems, data.len())?;
            for (row, value) in target.rows_mut().zip(data.data.iter()) {
                row.fill(0.0);
                row[0] = *value;
            }
        }
        ArrayType::Dg | ArrayType::DgStress => {
            check_length(
                name,
                num_elems * target.components(),
                num_elems * data.components,
            )?;
            check_length(name, num_elems, data.len())?;
            target.as_mut_slice().copy_from_slice(&data.data);
        }
        ArrayType::Vertex => {
            return Err(DynamicsError::ArrayType {
                name: name.to_string(),
                expected: ArrayType::H,
                found: ArrayType::Vertex,
            })
        }
    }

    Ok(())
}

/// Copy a DG field into an array of the given type
///
/// `H` arrays receive the element means; DG arrays receive all coefficients.
pub fn dg2ma(source: &DgField, array_type: ArrayType) -> ModelArray {
    match array_type {
        ArrayType::H | ArrayType::Vertex => ModelArray::h(source.means()),
        ArrayType::Dg | ArrayType::DgStress => ModelArray::dg(
            array_type,
            source.components(),
            source.as_slice().to_vec(),
        ),
    }
}

/// A DG field of `degree` built from an array, through [ma2dg]
pub fn dg_from_array(
    name: &str,
    data: &ModelArray,
    degree: DgDegree,
    num_elems: usize,
) -> Result<DgField, DynamicsError> {
    let mut field = DgField::new(degree, num_elems);
    ma2dg(name, data, &mut field)?;
    Ok(field)
}

fn check_length(name: &str, expected: usize, found: usize) -> Result<(), DynamicsError> {
    if expected == found {
        Ok(())
    } else {
        Err(DynamicsError::ArrayLength {
            name: name.to_string(),
            expected,
            found,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn h_arrays_fill_means() {
        let mut field = DgField::new(DgDegree::Dg1, 2);
        field.row_mut(0).copy_from_slice(&[9.0, 9.0, 9.0]);

        ma2dg("hice", &ModelArray::h(vec![1.0, 2.0]), &mut field).unwrap();
        assert_eq!(field.as_slice(), &[1.0, 0.0, 0.0, 2.0, 0.0, 0.0]);

        let back = dg2ma(&field, ArrayType::H);
        assert_eq!(back.array_type(), ArrayType::H);
        assert_eq!(back.data(), &[1.0, 2.0]);
    }

    #[test]
    fn dg_arrays_copy_all_components() {
        let data = ModelArray::dg(ArrayType::Dg, 3, vec![1.0, 0.1, 0.2, 2.0, 0.3, 0.4]);
        let field = dg_from_array("hsnow", &data, DgDegree::Dg1, 2).unwrap();
        assert_eq!(field.row(1), &[2.0, 0.3, 0.4]);
        assert_eq!(dg2ma(&field, ArrayType::Dg), data);
        assert_eq!(data.means().collect::<Vec<_>>(), vec![1.0, 2.0]);
    }

    #[test]
    fn mismatched_arrays() {
        let mut field = DgField::new(DgDegree::Dg2, 2);

        let wrong_components = ModelArray::dg(ArrayType::Dg, 3, vec![0.0; 6]);
        assert!(matches!(
            ma2dg("cice", &wrong_components, &mut field),
            Err(DynamicsError::ArrayLength {
                expected: 12,
                found: 6,
                ..
            })
        ));

        let wrong_length = ModelArray::h(vec![0.0; 3]);
        assert!(matches!(
            ma2dg("cice", &wrong_length, &mut field),
            Err(DynamicsError::ArrayLength { .. })
        ));

        let vertex = ModelArray::vertex(vec![0.0; 9]);
        assert!(matches!(
            ma2dg("cice", &vertex, &mut field),
            Err(DynamicsError::ArrayType { .. })
        ));
    }

    #[test]
    fn known_field_names() {
        assert_eq!(field_type("hsnow"), Some(ArrayType::Dg));
        assert_eq!(field_type("sst"), Some(ArrayType::H));
        assert_eq!(field_type("s12"), Some(ArrayType::DgStress));
        assert_eq!(field_type("uocean"), Some(ArrayType::Vertex));
        assert_eq!(field_type("albedo"), None);
    }

    #[test]
    #[should_panic]
    fn vertex_arrays_are_not_dg() {
        ModelArray::dg(ArrayType::Vertex, 1, vec![0.0]);
    }
}
