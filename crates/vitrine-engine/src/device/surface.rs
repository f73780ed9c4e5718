use winit::dpi::PhysicalSize;

/// What the frame loop does after a failed frame acquisition.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// The surface was configured again; the next frame may succeed.
    Reconfigured,
    SkipFrame,
    /// Out of memory. The runtime shuts down.
    Fatal,
}

/// Storage format of the swapchain plus the sRGB format it is viewed as.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) struct SurfaceFormats {
    pub storage: wgpu::TextureFormat,
    pub view: wgpu::TextureFormat,
}

impl SurfaceFormats {
    /// Extra view formats the surface must be configured with.
    pub fn view_formats(&self) -> Vec<wgpu::TextureFormat> {
        if self.view == self.storage {
            Vec::new()
        } else {
            vec![self.view]
        }
    }
}

/// Picks a surface format that can be written through an sRGB view.
///
/// A natively sRGB format wins; otherwise the first reported format is used
/// with its sRGB counterpart as the view format, when one exists.
pub(crate) fn choose_surface_formats(caps: &wgpu::SurfaceCapabilities) -> Option<SurfaceFormats> {
    if let Some(&srgb) = caps.formats.iter().find(|f| f.is_srgb()) {
        return Some(SurfaceFormats {
            storage: srgb,
            view: srgb,
        });
    }

    let storage = *caps.formats.first()?;
    Some(SurfaceFormats {
        storage,
        view: storage.add_srgb_suffix(),
    })
}

pub(crate) fn choose_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| caps.alpha_modes.contains(m))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// Records `new_size`; a zero-area size leaves the surface configured as is.
pub(crate) fn apply_resize(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &mut wgpu::SurfaceConfiguration,
    size: &mut PhysicalSize<u32>,
    new_size: PhysicalSize<u32>,
) {
    *size = new_size;
    if new_size.width == 0 || new_size.height == 0 {
        return;
    }

    config.width = new_size.width;
    config.height = new_size.height;
    surface.configure(device, config);
}

pub(crate) fn map_surface_error(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    err: wgpu::SurfaceError,
) -> SurfaceErrorAction {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
            if size.width > 0 && size.height > 0 {
                surface.configure(device, config);
            }
            SurfaceErrorAction::Reconfigured
        }
        wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use wgpu::TextureFormat as Tf;

    fn caps(formats: &[Tf], alpha: &[wgpu::CompositeAlphaMode]) -> wgpu::SurfaceCapabilities {
        wgpu::SurfaceCapabilities {
            formats: formats.to_vec(),
            alpha_modes: alpha.to_vec(),
            ..Default::default()
        }
    }

    // ── formats ───────────────────────────────────────────────────────────

    #[test]
    fn native_srgb_format_wins() {
        let f = choose_surface_formats(&caps(&[Tf::Bgra8Unorm, Tf::Bgra8UnormSrgb], &[]))
            .expect("formats");
        assert_eq!(f.storage, Tf::Bgra8UnormSrgb);
        assert!(f.view_formats().is_empty());
    }

    #[test]
    fn linear_format_is_viewed_as_srgb() {
        let f = choose_surface_formats(&caps(&[Tf::Rgba8Unorm], &[])).expect("formats");
        assert_eq!(f.storage, Tf::Rgba8Unorm);
        assert_eq!(f.view, Tf::Rgba8UnormSrgb);
        assert_eq!(f.view_formats(), [Tf::Rgba8UnormSrgb]);
    }

    #[test]
    fn no_formats_means_no_surface() {
        assert_eq!(choose_surface_formats(&caps(&[], &[])), None);
    }

    // ── alpha ─────────────────────────────────────────────────────────────

    #[test]
    fn unsupported_alpha_mode_falls_back() {
        let c = caps(&[], &[wgpu::CompositeAlphaMode::Opaque]);
        assert_eq!(
            choose_alpha_mode(&c, Some(wgpu::CompositeAlphaMode::PreMultiplied)),
            wgpu::CompositeAlphaMode::Opaque
        );
        assert_eq!(
            choose_alpha_mode(&caps(&[], &[]), None),
            wgpu::CompositeAlphaMode::Auto
        );
    }
}
