use super::helpers;
use super::targets::{GpuTexture, STATE_FORMAT};
use ripple_core::{CompositeUniforms, PhysicsUniforms};

/// Pipelines, layouts and uniform buffers for the two passes.
pub struct GpuPrograms {
    pub(crate) physics_bgl: wgpu::BindGroupLayout, // state tex + uniform
    pub(crate) composite_bgl: wgpu::BindGroupLayout, // state tex + video tex + sampler + uniform
    pub(crate) physics_uniforms: wgpu::Buffer,
    pub(crate) composite_uniforms: wgpu::Buffer,
    pub(crate) video_sampler: wgpu::Sampler,
    pub(crate) physics_pipeline: wgpu::RenderPipeline,
    pub(crate) composite_pipeline: wgpu::RenderPipeline,
}

pub(crate) fn create_programs(
    device: &wgpu::Device,
    physics_shader: &wgpu::ShaderModule,
    composite_shader: &wgpu::ShaderModule,
    surface_format: wgpu::TextureFormat,
) -> GpuPrograms {
    // State texels are fetched with textureLoad, so Rgba16Float need not be filterable
    let physics_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("physics_bgl"),
        entries: &[helpers::texture_entry(0, false), helpers::uniform_entry(1)],
    });
    let composite_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("composite_bgl"),
        entries: &[
            helpers::texture_entry(0, false),
            helpers::texture_entry(1, true),
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
            helpers::uniform_entry(3),
        ],
    });
    let physics_uniforms = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("physics_uniforms"),
        size: std::mem::size_of::<PhysicsUniforms>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let composite_uniforms = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("composite_uniforms"),
        size: std::mem::size_of::<CompositeUniforms>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let video_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("video_sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    });

    let pl_physics = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("pl_physics"),
        bind_group_layouts: &[&physics_bgl],
        push_constant_ranges: &[],
    });
    let pl_composite = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("pl_composite"),
        bind_group_layouts: &[&composite_bgl],
        push_constant_ranges: &[],
    });
    let physics_pipeline = helpers::make_fullscreen_pipeline(
        device,
        "physics_pipeline",
        &pl_physics,
        physics_shader,
        "fs_physics",
        STATE_FORMAT,
        None,
    );
    let composite_pipeline = helpers::make_fullscreen_pipeline(
        device,
        "composite_pipeline",
        &pl_composite,
        composite_shader,
        "fs_composite",
        surface_format,
        Some(wgpu::BlendState::REPLACE),
    );

    GpuPrograms {
        physics_bgl,
        composite_bgl,
        physics_uniforms,
        composite_uniforms,
        video_sampler,
        physics_pipeline,
        composite_pipeline,
    }
}

pub(crate) fn encode_physics(
    device: &wgpu::Device,
    encoder: &mut wgpu::CommandEncoder,
    programs: &GpuPrograms,
    read: &GpuTexture,
    write: &GpuTexture,
) {
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("physics_bg"),
        layout: &programs.physics_bgl,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&read.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: programs.physics_uniforms.as_entire_binding(),
            },
        ],
    });
    helpers::fullscreen_pass(
        encoder,
        "physics_pass",
        &write.view,
        wgpu::Color::TRANSPARENT,
        &programs.physics_pipeline,
        &bind_group,
    );
}

pub(crate) fn encode_composite(
    device: &wgpu::Device,
    encoder: &mut wgpu::CommandEncoder,
    programs: &GpuPrograms,
    state: &GpuTexture,
    video: &GpuTexture,
    target: &wgpu::TextureView,
) {
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("composite_bg"),
        layout: &programs.composite_bgl,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&state.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&video.view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(&programs.video_sampler),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: programs.composite_uniforms.as_entire_binding(),
            },
        ],
    });
    helpers::fullscreen_pass(
        encoder,
        "composite_pass",
        target,
        wgpu::Color::BLACK,
        &programs.composite_pipeline,
        &bind_group,
    );
}
