//! Shader library.
//!
//! Named render pipelines sharing one vertex format and one texture-array
//! bind group layout. Each entry owns its scene uniform (view-projection,
//! written by `start_scene`) and an effect uniform used by the procedural
//! shaders (`grid`, `dots`).

use std::collections::HashMap;
use std::num::NonZeroU32;

use anyhow::{Context, Result};
use bytemuck::{Pod, Zeroable};
use glam::Mat4;

/// Per-scene uniform: the camera's combined view-projection matrix.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct SceneUniform {
    pub view_projection: [[f32; 4]; 4],
}

impl SceneUniform {
    pub fn new(view_projection: &Mat4) -> Self {
        Self {
            view_projection: view_projection.to_cols_array_2d(),
        }
    }
}

/// Parameters for the procedural effect shaders.
///
/// One struct covers both effects; each shader reads the fields it needs.
/// Field order matches the WGSL declaration (16-byte aligned rows).
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, Pod, Zeroable)]
pub struct EffectUniform {
    pub resolution: [f32; 2],
    pub cell_size: f32,
    pub zoom: f32,
    pub camera_position: [f32; 3],
    pub radius: f32,
    pub spacing: f32,
    pub circle_count: f32,
    pub run_time: f32,
    pub _pad: f32,
}

/// One named pipeline with its uniforms.
pub(crate) struct ShaderEntry {
    pub(crate) pipeline: wgpu::RenderPipeline,
    scene_buffer: wgpu::Buffer,
    effect_buffer: wgpu::Buffer,
    pub(crate) bind_group: wgpu::BindGroup,
}

impl ShaderEntry {
    pub(crate) fn write_scene(&self, queue: &wgpu::Queue, uniform: &SceneUniform) {
        queue.write_buffer(&self.scene_buffer, 0, bytemuck::bytes_of(uniform));
    }

    pub(crate) fn write_effect(&self, queue: &wgpu::Queue, uniform: &EffectUniform) {
        queue.write_buffer(&self.effect_buffer, 0, bytemuck::bytes_of(uniform));
    }
}

/// The engine's shader set, keyed by name.
///
/// `default` draws colored/textured quads, `text` samples atlas coverage,
/// `grid` and `dots` are procedural overlays. All pipelines share the batch
/// vertex layout and the texture-array bind group.
pub struct ShaderLibrary {
    entries: HashMap<&'static str, ShaderEntry>,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

const SHADER_SOURCES: [(&str, &str); 4] = [
    ("default", include_str!("shaders/quad.wgsl")),
    ("text", include_str!("shaders/text.wgsl")),
    ("grid", include_str!("shaders/grid.wgsl")),
    ("dots", include_str!("shaders/dots.wgsl")),
];

impl ShaderLibrary {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        vertex_layout: wgpu::VertexBufferLayout<'_>,
        max_texture_units: u32,
    ) -> Result<Self> {
        let texture_count = NonZeroU32::new(max_texture_units)
            .context("texture slot count must be non-zero")?;

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("armada scene bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<SceneUniform>() as u64,
                        ),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<EffectUniform>() as u64,
                        ),
                    },
                    count: None,
                },
            ],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("armada texture array bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: Some(texture_count),
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("armada batch pipeline layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            immediate_size: 0,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("armada batch sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let mut entries = HashMap::new();

        for (name, source) in SHADER_SOURCES {
            let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(name),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });

            let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(name),
                layout: Some(&pipeline_layout),

                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[vertex_layout.clone()],
                },

                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: surface_format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),

                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },

                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            });

            let scene_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("armada scene ubo"),
                size: std::mem::size_of::<SceneUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });

            let effect_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("armada effect ubo"),
                size: std::mem::size_of::<EffectUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });

            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(name),
                layout: &uniform_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: scene_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: effect_buffer.as_entire_binding(),
                    },
                ],
            });

            entries.insert(
                name,
                ShaderEntry {
                    pipeline,
                    scene_buffer,
                    effect_buffer,
                    bind_group,
                },
            );
        }

        Ok(Self {
            entries,
            texture_layout,
            sampler,
        })
    }

    /// Resolves a user-supplied name to the library's canonical key.
    pub(crate) fn canonical_name(&self, name: &str) -> Option<&'static str> {
        self.entries.get_key_value(name).map(|(key, _)| *key)
    }

    pub(crate) fn get(&self, name: &str) -> Option<&ShaderEntry> {
        self.entries.get(name)
    }

    /// Builds the texture-array bind group for one flush.
    ///
    /// `views` must contain exactly the slot-table size (unused slots padded
    /// with the white fallback by the renderer).
    pub(crate) fn texture_bind_group(
        &self,
        device: &wgpu::Device,
        views: &[&wgpu::TextureView],
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("armada texture array"),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureViewArray(views),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }
}
