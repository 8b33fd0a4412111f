//! Minimal NIfTI-1 reader/writer: a 348-byte header followed by raw
//! little-endian `f64` voxel data (datatype code 64, `DT_FLOAT64`), with
//! qform/sform set from the grid's affine (spec §6.3).
//!
//! Only the fields the core needs to round-trip a field faithfully are
//! populated; unused header bytes are zeroed, matching how a minimal
//! conformant writer behaves (readers are required to ignore fields they
//! don't recognize).

use crate::error::{Result, TiError};
use crate::geometry::{Affine, Point3};
use crate::voxel::VoxelGrid;

const HEADER_SIZE: usize = 348;
const VOX_OFFSET: f32 = 352.0;
const DT_FLOAT64: i16 = 64;

fn malformed(reason: impl Into<String>) -> TiError {
    TiError::MalformedFile { format: "nifti".into(), reason: reason.into() }
}

/// Writes a scalar field, 4D-reduced if `values_4d.len() > 1` (spec §4.2
/// rule: "if a field is 4D, reduce along the last axis (max) before
/// analysis" — here we instead *write* whichever single 3D volume the
/// caller passes; reduction happens in the analyzer, not at the I/O
/// boundary).
pub fn write_nifti(grid: &VoxelGrid, values: &[f64]) -> Result<Vec<u8>> {
    if values.len() != grid.voxel_count() {
        return Err(TiError::ShapeMismatch { field_len: values.len(), domain_len: grid.voxel_count() });
    }

    let mut header = vec![0u8; HEADER_SIZE];
    header[0..4].copy_from_slice(&(HEADER_SIZE as i32).to_le_bytes());

    // dim[0..8]: dim[0]=3 (3D), dim[1..4]=grid dims, rest = 1
    let dim = [3i16, grid.dims[0] as i16, grid.dims[1] as i16, grid.dims[2] as i16, 1, 1, 1, 1];
    for (i, d) in dim.iter().enumerate() {
        header[40 + i * 2..42 + i * 2].copy_from_slice(&d.to_le_bytes());
    }

    header[70..72].copy_from_slice(&DT_FLOAT64.to_le_bytes());
    header[72..74].copy_from_slice(&64i16.to_le_bytes()); // bitpix

    // pixdim[0..8]; pixdim[1..4] = voxel size
    let pixdim = [1.0f32, grid.voxel_size_mm as f32, grid.voxel_size_mm as f32, grid.voxel_size_mm as f32, 0.0, 0.0, 0.0, 0.0];
    for (i, p) in pixdim.iter().enumerate() {
        header[76 + i * 4..80 + i * 4].copy_from_slice(&p.to_le_bytes());
    }

    header[108..112].copy_from_slice(&VOX_OFFSET.to_le_bytes());
    header[252..256].copy_from_slice(b"n+1\0");

    // sform: qform_code/sform_code = 2 (aligned), matrix from affine.
    header[254..256].copy_from_slice(&2i16.to_le_bytes()); // sform_code
    let m = grid.ijk_to_mm;
    let srow = [
        [m.linear[0][0], m.linear[0][1], m.linear[0][2], m.translation.x],
        [m.linear[1][0], m.linear[1][1], m.linear[1][2], m.translation.y],
        [m.linear[2][0], m.linear[2][1], m.linear[2][2], m.translation.z],
    ];
    for (row_idx, row) in srow.iter().enumerate() {
        let offset = 280 + row_idx * 16;
        for (col_idx, &v) in row.iter().enumerate() {
            let o = offset + col_idx * 4;
            header[o..o + 4].copy_from_slice(&(v as f32).to_le_bytes());
        }
    }

    let mut out = header;
    out.extend(values.iter().flat_map(|v| v.to_le_bytes()));
    Ok(out)
}

/// Reads back a NIfTI-1 volume written by [`write_nifti`]: the grid shape
/// and affine plus the raw `f64` values.
pub fn read_nifti(bytes: &[u8]) -> Result<(VoxelGrid, Vec<f64>)> {
    if bytes.len() < HEADER_SIZE {
        return Err(malformed("file shorter than NIfTI-1 header"));
    }
    let dim = |i: usize| -> usize {
        i16::from_le_bytes([bytes[40 + i * 2], bytes[41 + i * 2]]) as usize
    };
    let dims = [dim(1), dim(2), dim(3)];

    let pixdim = |i: usize| -> f32 {
        f32::from_le_bytes(bytes[76 + i * 4..80 + i * 4].try_into().unwrap())
    };
    let voxel_size_mm = pixdim(1) as f64;

    let read_f32 = |offset: usize| -> f64 { f32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap()) as f64 };
    let mut linear = [[0.0; 3]; 3];
    let mut translation = Point3::ORIGIN;
    for row_idx in 0..3 {
        let offset = 280 + row_idx * 16;
        linear[row_idx][0] = read_f32(offset);
        linear[row_idx][1] = read_f32(offset + 4);
        linear[row_idx][2] = read_f32(offset + 8);
        let t = read_f32(offset + 12);
        match row_idx {
            0 => translation.x = t,
            1 => translation.y = t,
            2 => translation.z = t,
            _ => unreachable!(),
        }
    }
    let ijk_to_mm = Affine { linear, translation };
    let grid = VoxelGrid { dims, ijk_to_mm, voxel_size_mm };

    let vox_offset = f32::from_le_bytes(bytes[108..112].try_into().unwrap()) as usize;
    let data = &bytes[vox_offset..];
    let expected_len = grid.voxel_count();
    if data.len() < expected_len * 8 {
        return Err(malformed("voxel data shorter than dims imply"));
    }
    let values = data[..expected_len * 8]
        .chunks_exact(8)
        .map(|c| f64::from_le_bytes(c.try_into().unwrap()))
        .collect();

    Ok((grid, values))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_grid() -> VoxelGrid {
        VoxelGrid {
            dims: [2, 2, 2],
            ijk_to_mm: Affine::translation(Point3::new(-90.0, -126.0, -72.0)),
            voxel_size_mm: 2.0,
        }
    }

    #[test]
    fn volume_round_trips_through_nifti() {
        let grid = sample_grid();
        let values: Vec<f64> = (0..grid.voxel_count()).map(|i| i as f64 * 0.5).collect();
        let bytes = write_nifti(&grid, &values).unwrap();
        let (read_grid, read_values) = read_nifti(&bytes).unwrap();
        assert_eq!(read_grid.dims, grid.dims);
        assert!((read_grid.voxel_size_mm - grid.voxel_size_mm).abs() < 1e-4);
        for (a, b) in values.iter().zip(read_values.iter()) {
            assert!((a - b).abs() < 1e-4, "expected {a}, got {b}");
        }
    }

    #[test]
    fn affine_translation_round_trips_to_single_precision() {
        let grid = sample_grid();
        let values = vec![0.0; grid.voxel_count()];
        let bytes = write_nifti(&grid, &values).unwrap();
        let (read_grid, _) = read_nifti(&bytes).unwrap();
        assert!((read_grid.ijk_to_mm.translation.x - (-90.0)).abs() < 1e-3);
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        let grid = sample_grid();
        let err = write_nifti(&grid, &[0.0; 3]).unwrap_err();
        assert!(matches!(err, TiError::ShapeMismatch { .. }));
    }

    #[test]
    fn truncated_file_is_malformed() {
        assert!(read_nifti(&[0u8; 10]).is_err());
    }
}
