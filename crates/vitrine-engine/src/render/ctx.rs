use super::plan::FramePlan;

/// Device handles for one frame, created by [`Gpu::render_ctx`](crate::device::Gpu::render_ctx).
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    /// Format of [`RenderTarget::surface`]; always an sRGB format when the
    /// platform offers one.
    pub surface_format: wgpu::TextureFormat,
    /// Configured swapchain size in physical pixels.
    pub surface_size: (u32, u32),
}

impl<'a> RenderCtx<'a> {
    pub(crate) fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        surface_size: (u32, u32),
    ) -> Self {
        Self {
            device,
            queue,
            surface_format,
            surface_size,
        }
    }

    /// `false` while a plan recorded before a resize is being drawn.
    pub fn matches(&self, plan: &FramePlan) -> bool {
        plan.size == self.surface_size
    }
}

/// Encoder plus the swapchain view of the frame being recorded.
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub surface: &'a wgpu::TextureView,
}

impl<'a> RenderTarget<'a> {
    pub(crate) fn new(encoder: &'a mut wgpu::CommandEncoder, surface: &'a wgpu::TextureView) -> Self {
        Self { encoder, surface }
    }
}
