//! Blur provider.

use image::DynamicImage;

/// Degrades an image by a given intensity.
pub trait BlurProvider: Send + Sync {
    /// Returns a blurred copy of `image`.
    ///
    /// Intensities at or below the provider's floor return an unmodified copy.
    fn blur(&self, image: &DynamicImage, intensity: u32) -> DynamicImage;
}

/// Gaussian smoothing where the intensity is the kernel size.
#[derive(Debug, Clone, Copy)]
pub struct GaussianBlur {
    /// Intensities at or below this value are passed through.
    floor: u32,
}

impl GaussianBlur {
    pub fn new() -> Self {
        Self { floor: 1 }
    }

    /// Creates a provider that passes images through at or below `floor`.
    ///
    /// Typically the weakest level of the blur schedule.
    pub fn with_floor(floor: u32) -> Self {
        Self { floor }
    }

    /// Converts a kernel size to a Gaussian sigma.
    ///
    /// Uses the same rule OpenCV applies when sigma is left at zero.
    pub fn sigma_for_kernel(kernel: u32) -> f32 {
        let k = kernel.max(1) as f32;
        0.3 * ((k - 1.0) * 0.5 - 1.0) + 0.8
    }
}

impl Default for GaussianBlur {
    fn default() -> Self {
        Self::new()
    }
}

impl BlurProvider for GaussianBlur {
    fn blur(&self, image: &DynamicImage, intensity: u32) -> DynamicImage {
        if intensity <= self.floor.max(1) {
            return image.clone();
        }

        let sigma = Self::sigma_for_kernel(intensity);
        tracing::trace!(intensity, sigma, "Applying Gaussian blur");
        image.blur(sigma)
    }
}
