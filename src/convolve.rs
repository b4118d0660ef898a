//! 2D FFT convolution of an intensity image with a stellar PSF.
//!
//! Linear convolution on an FFT grid padded to the next even power of two of
//! H+Ph−1 by W+Pw−1. The image is sampled over the whole grid with a
//! configurable boundary policy, the PSF occupies the top-left corner, and
//! the product spectrum is cropped back according to the output mode. The
//! forward/inverse transforms are unnormalized, so the result is divided by
//! FH·FW and by the PSF weight sum (a flat image convolved with a normalized
//! PSF maps to itself).

use ndarray::{Array2, ArrayView2};
use num_complex::Complex64;
use rustfft::FftPlanner;

use crate::error::{OccultError, Result};

/// Output sizing of the convolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvolveMode {
    /// Output matches the input image size.
    Same,
    /// Full linear convolution, (H+Ph−1)×(W+Pw−1).
    Full,
    /// Only where image and PSF fully overlap, (H−Ph+1)×(W−Pw+1).
    Valid,
}

/// Boundary policy for pixels sampled outside the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaddingMode {
    /// Outside pixels are zero.
    Zeros,
    /// Mirror without repeating the edge pixel (period 2n−2).
    Reflect,
    /// Clamp to the nearest edge pixel.
    Replicate,
    /// Wrap around modulo the image size.
    Circular,
}

/// Convolve `image` with `psf` by 2D FFT.
///
/// `psf_sum` is the PSF weight sum used as the normalization divisor. With
/// `centered_psf` the PSF is ifftshifted so its central peak lands at grid
/// index (0, 0); leave it false for a PSF whose alignment should come from
/// the mode-specific crop of the full result (a centered delta PSF then maps
/// the image to itself in `Same` mode).
pub fn convolve_psf_fft(
    image: ArrayView2<'_, f64>,
    psf: ArrayView2<'_, f64>,
    psf_sum: f64,
    mode: ConvolveMode,
    padding: PaddingMode,
    centered_psf: bool,
) -> Result<Array2<f64>> {
    let (img_h, img_w) = image.dim();
    let (psf_h, psf_w) = psf.dim();
    if img_h == 0 || img_w == 0 || psf_h == 0 || psf_w == 0 {
        return Err(OccultError::InvalidInput(
            "empty image or psf".into(),
        ));
    }
    if psf_sum <= 0.0 {
        return Err(OccultError::NumericalDegeneracy(format!(
            "psf weight sum must be positive, got {psf_sum}"
        )));
    }

    let (out_h, out_w) = match mode {
        ConvolveMode::Same => (img_h, img_w),
        ConvolveMode::Full => (img_h + psf_h - 1, img_w + psf_w - 1),
        ConvolveMode::Valid => {
            if psf_h > img_h || psf_w > img_w {
                return Err(OccultError::InvalidInput(
                    "valid convolution requested but psf larger than image".into(),
                ));
            }
            (img_h - psf_h + 1, img_w - psf_w + 1)
        }
    };

    let fft_h = even_pow2(img_h + psf_h - 1);
    let fft_w = even_pow2(img_w + psf_w - 1);

    let mut a = Array2::<Complex64>::zeros((fft_h, fft_w));
    for y in 0..fft_h {
        for x in 0..fft_w {
            a[[y, x]] = Complex64::new(sample(image, y as isize, x as isize, padding), 0.0);
        }
    }

    let mut b = Array2::<Complex64>::zeros((fft_h, fft_w));
    if centered_psf {
        let shifted = ifftshift(psf);
        for y in 0..psf_h {
            for x in 0..psf_w {
                b[[y, x]] = Complex64::new(shifted[[y, x]], 0.0);
            }
        }
    } else {
        for y in 0..psf_h {
            for x in 0..psf_w {
                b[[y, x]] = Complex64::new(psf[[y, x]], 0.0);
            }
        }
    }

    fft2_in_place(&mut a, true);
    fft2_in_place(&mut b, true);
    a.zip_mut_with(&b, |av, &bv| *av *= bv);
    fft2_in_place(&mut a, false);

    let scale = (fft_h * fft_w) as f64 * psf_sum;
    let full = Array2::from_shape_fn((img_h + psf_h - 1, img_w + psf_w - 1), |(y, x)| {
        a[[y, x]].re / scale
    });

    let (off_y, off_x) = match mode {
        ConvolveMode::Full => return Ok(full),
        ConvolveMode::Same => (psf_h / 2, psf_w / 2),
        ConvolveMode::Valid => (psf_h - 1, psf_w - 1),
    };
    Ok(full
        .slice(ndarray::s![off_y..off_y + out_h, off_x..off_x + out_w])
        .to_owned())
}

/// Smallest even power of two that holds `n`.
fn even_pow2(n: usize) -> usize {
    let mut p = 1;
    while p < n {
        p <<= 1;
    }
    if p % 2 != 0 {
        p += 1; // n == 1
    }
    p
}

/// Read a pixel, applying the boundary policy outside the image.
fn sample(image: ArrayView2<'_, f64>, y: isize, x: isize, padding: PaddingMode) -> f64 {
    let (h, w) = image.dim();
    let (h_i, w_i) = (h as isize, w as isize);

    if (0..h_i).contains(&y) && (0..w_i).contains(&x) {
        return image[[y as usize, x as usize]];
    }

    match padding {
        PaddingMode::Zeros => 0.0,
        PaddingMode::Replicate => {
            let yy = y.clamp(0, h_i - 1) as usize;
            let xx = x.clamp(0, w_i - 1) as usize;
            image[[yy, xx]]
        }
        PaddingMode::Reflect => image[[reflect_index(y, h), reflect_index(x, w)]],
        PaddingMode::Circular => image[[wrap_index(y, h), wrap_index(x, w)]],
    }
}

/// Mirror an index without repeating the edge sample: for n = 5 the pattern
/// is … 2 1 0 1 2 3 4 3 2 1 0 1 …
fn reflect_index(i: isize, n: usize) -> usize {
    if n <= 1 {
        return 0;
    }
    let period = 2 * n as isize - 2;
    let mut i = i.rem_euclid(period);
    if i >= n as isize {
        i = period - i;
    }
    i as usize
}

fn wrap_index(i: isize, n: usize) -> usize {
    i.rem_euclid(n as isize) as usize
}

/// Move the center of a centered PSF to index (0, 0).
fn ifftshift(psf: ArrayView2<'_, f64>) -> Array2<f64> {
    let (h, w) = psf.dim();
    let (sh_y, sh_x) = (h / 2, w / 2);
    Array2::from_shape_fn((h, w), |(y, x)| psf[[(y + sh_y) % h, (x + sh_x) % w]])
}

/// Unnormalized 2D FFT, rows then columns.
fn fft2_in_place(a: &mut Array2<Complex64>, forward: bool) {
    let (h, w) = a.dim();
    let mut planner = FftPlanner::new();
    let row_fft = if forward {
        planner.plan_fft_forward(w)
    } else {
        planner.plan_fft_inverse(w)
    };
    let col_fft = if forward {
        planner.plan_fft_forward(h)
    } else {
        planner.plan_fft_inverse(h)
    };

    for mut row in a.rows_mut() {
        let slice = row
            .as_slice_mut()
            .expect("fft buffer is freshly allocated in standard layout");
        row_fft.process(slice);
    }

    let mut column = vec![Complex64::new(0.0, 0.0); h];
    for x in 0..w {
        for y in 0..h {
            column[y] = a[[y, x]];
        }
        col_fft.process(&mut column);
        for y in 0..h {
            a[[y, x]] = column[y];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn delta_psf(size: usize) -> Array2<f64> {
        let mut psf = Array2::zeros((size, size));
        psf[[size / 2, size / 2]] = 1.0;
        psf
    }

    #[test]
    fn test_delta_psf_is_identity_in_same_mode() {
        let image = Array2::from_shape_fn((16, 16), |(y, x)| ((3 * x + 7 * y) % 11) as f64);
        let psf = delta_psf(5);
        let out = convolve_psf_fft(
            image.view(),
            psf.view(),
            1.0,
            ConvolveMode::Same,
            PaddingMode::Zeros,
            false,
        )
        .unwrap();
        assert_eq!(out.dim(), (16, 16));
        for (&a, &b) in out.iter().zip(image.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_full_mode_matches_direct_convolution() {
        let image = array![[1.0, 2.0], [3.0, 4.0]];
        let psf = array![[1.0, 1.0], [1.0, 1.0]];
        let out = convolve_psf_fft(
            image.view(),
            psf.view(),
            1.0,
            ConvolveMode::Full,
            PaddingMode::Zeros,
            false,
        )
        .unwrap();
        let expected = array![[1.0, 3.0, 2.0], [4.0, 10.0, 6.0], [3.0, 7.0, 4.0]];
        assert_eq!(out.dim(), (3, 3));
        for (&a, &b) in out.iter().zip(expected.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_valid_mode_size_and_values() {
        let image = Array2::from_elem((6, 6), 2.0);
        let psf = Array2::from_elem((3, 3), 1.0);
        let out = convolve_psf_fft(
            image.view(),
            psf.view(),
            9.0,
            ConvolveMode::Valid,
            PaddingMode::Zeros,
            false,
        )
        .unwrap();
        assert_eq!(out.dim(), (4, 4));
        for &v in out.iter() {
            assert_relative_eq!(v, 2.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_replicate_padding_preserves_flat_image() {
        let image = Array2::from_elem((12, 12), 1.0);
        let psf = Array2::from_elem((5, 5), 0.4);
        let sum: f64 = psf.iter().sum();
        let out = convolve_psf_fft(
            image.view(),
            psf.view(),
            sum,
            ConvolveMode::Same,
            PaddingMode::Replicate,
            false,
        )
        .unwrap();
        for &v in out.iter() {
            assert_relative_eq!(v, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_zero_padding_dims_the_border() {
        let image = Array2::from_elem((12, 12), 1.0);
        let psf = Array2::from_elem((5, 5), 1.0);
        let out = convolve_psf_fft(
            image.view(),
            psf.view(),
            25.0,
            ConvolveMode::Same,
            PaddingMode::Zeros,
            false,
        )
        .unwrap();
        // Interior untouched, corner sees only a 3x3 overlap.
        assert_relative_eq!(out[[6, 6]], 1.0, epsilon = 1e-9);
        assert_relative_eq!(out[[0, 0]], 9.0 / 25.0, epsilon = 1e-9);
    }

    #[test]
    fn test_reflect_index_pattern() {
        // n = 5: … 2 1 0 1 2 3 4 3 2 …
        let got: Vec<usize> = (-3..8).map(|i| reflect_index(i, 5)).collect();
        assert_eq!(got, vec![3, 2, 1, 0, 1, 2, 3, 4, 3, 2, 1]);
        assert_eq!(reflect_index(-1, 1), 0);
    }

    #[test]
    fn test_ifftshift_moves_center_to_origin() {
        let psf = delta_psf(5);
        let shifted = ifftshift(psf.view());
        assert_eq!(shifted[[0, 0]], 1.0);
        assert_eq!(shifted.iter().filter(|&&v| v != 0.0).count(), 1);
    }

    #[test]
    fn test_centered_delta_with_ifftshift_is_identity_without_crop_offset() {
        // With the shift applied the full-grid result is already aligned, so
        // the Full-mode top-left HxW block equals the image.
        let image = Array2::from_shape_fn((8, 8), |(y, x)| (x as f64) - (y as f64) * 0.5);
        let psf = delta_psf(5);
        let out = convolve_psf_fft(
            image.view(),
            psf.view(),
            1.0,
            ConvolveMode::Full,
            PaddingMode::Zeros,
            true,
        )
        .unwrap();
        for y in 0..8 {
            for x in 0..8 {
                assert_relative_eq!(out[[y, x]], image[[y, x]], epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_rejections() {
        let image = Array2::<f64>::zeros((4, 4));
        let psf = Array2::<f64>::zeros((6, 6));
        assert!(convolve_psf_fft(
            image.view(),
            psf.view(),
            1.0,
            ConvolveMode::Valid,
            PaddingMode::Zeros,
            false
        )
        .is_err());
        assert!(convolve_psf_fft(
            image.view(),
            psf.view(),
            0.0,
            ConvolveMode::Same,
            PaddingMode::Zeros,
            false
        )
        .is_err());
    }
}
