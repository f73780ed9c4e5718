/// How the window's GPU context is created.
///
/// The compositor always ends in a tone-mapping pass that writes linear colour,
/// so the surface is presented through an sRGB view regardless of what is set
/// here (see [`Gpu::surface_format`](super::Gpu::surface_format)).
#[derive(Debug, Clone)]
pub struct GpuInit {
    pub backends: wgpu::Backends,
    pub power_preference: wgpu::PowerPreference,

    /// `true` paces presentation (and therefore the frame clock) to the
    /// display; `false` presents as fast as the backend allows.
    pub vsync: bool,

    /// Requested compositing mode; unsupported values fall back to the first
    /// mode the surface reports.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    pub required_limits: wgpu::Limits,

    /// Frames the CPU may queue ahead of presentation. A hint.
    pub frame_latency: u32,
}

impl GpuInit {
    /// Defaults, overridden by `WGPU_BACKEND` and `WGPU_POWER_PREF` when set.
    pub fn from_env() -> Self {
        let mut init = Self::default();
        if let Some(backends) = wgpu::Backends::from_env() {
            init.backends = backends;
        }
        if let Some(pref) = wgpu::PowerPreference::from_env() {
            init.power_preference = pref;
        }
        init
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    pub(crate) fn present_mode(&self) -> wgpu::PresentMode {
        if self.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        }
    }
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::HighPerformance,
            vsync: true,
            alpha_mode: None,
            required_limits: wgpu::Limits::default(),
            frame_latency: 2,
        }
    }
}
