use anyhow::Result;

use crate::render::pipeline::RenderPipelineConfiguration;

pub const PRIMITIVE_VERTEX_TEMPLATE: &str = "primitive/primitive.vert";
pub const PRIMITIVE_FRAGMENT_TEMPLATE: &str = "primitive/primitive.frag";

/// Shader templates are compiled into the binary so the viewer does not
/// depend on its working directory.
pub fn create_shader_templates() -> Result<tera::Tera> {
    let mut tera = tera::Tera::default();
    tera.add_raw_templates(vec![
        (
            PRIMITIVE_VERTEX_TEMPLATE,
            include_str!("../../shaders/primitive/primitive.vert"),
        ),
        (
            PRIMITIVE_FRAGMENT_TEMPLATE,
            include_str!("../../shaders/primitive/primitive.frag"),
        ),
    ])?;

    Ok(tera)
}

pub struct ShaderModulePackage {
    pub vertex_shader_module: wgpu::ShaderModule,
    pub fragment_shader_module: wgpu::ShaderModule,
}

impl ShaderModulePackage {
    pub fn from_templates(
        name: &str,
        device: &wgpu::Device,
        tera: &tera::Tera,
        shader_template_config: &ShaderTemplateConfiguration,
    ) -> Result<Self> {
        let (vertex_shader_source, fragment_shader_source) =
            ShaderModulePackage::render_sources(tera, shader_template_config)?;

        log::debug!(
            "Creating shader module package {name} from config: {:?}",
            shader_template_config
        );

        Ok(ShaderModulePackage {
            vertex_shader_module: device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&format!("{name}_VERTEX_SHADER_MODULE")),
                source: wgpu::ShaderSource::Wgsl(vertex_shader_source.into()),
            }),
            fragment_shader_module: device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&format!("{name}_FRAGMENT_SHADER_MODULE")),
                source: wgpu::ShaderSource::Wgsl(fragment_shader_source.into()),
            }),
        })
    }

    /// Renders the WGSL for the vertex and fragment stages.
    pub fn render_sources(
        tera: &tera::Tera,
        shader_template_config: &ShaderTemplateConfiguration,
    ) -> Result<(String, String)> {
        let context = tera::Context::from_serialize(shader_template_config)?;

        Ok((
            tera.render(PRIMITIVE_VERTEX_TEMPLATE, &context)?,
            tera.render(PRIMITIVE_FRAGMENT_TEMPLATE, &context)?,
        ))
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Serialize)]
pub struct ShaderTemplateConfiguration {
    pub has_tex_coord_0: bool,
    pub tex_coord_0_location: u32,
}

impl ShaderTemplateConfiguration {
    pub fn from_render_pipeline_config(config: &RenderPipelineConfiguration) -> Self {
        Self {
            has_tex_coord_0: config.has_tex_coord_0,
            tex_coord_0_location: config.get_tex_coord_0_location(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(has_tex_coord_0: bool) -> (String, String) {
        let tera = create_shader_templates().unwrap();
        let config = ShaderTemplateConfiguration::from_render_pipeline_config(
            &RenderPipelineConfiguration { has_tex_coord_0 },
        );

        ShaderModulePackage::render_sources(&tera, &config).unwrap()
    }

    #[test]
    fn test_textured_vertex_stage_reads_tex_coords() {
        let (vertex, fragment) = render(true);

        assert!(vertex.contains("@location(1) tex_coord_0: vec2<f32>"));
        assert!(vertex.contains("out.tex_coord_0 = in.tex_coord_0;"));
        assert!(fragment.contains("fn fs_main"));
    }

    #[test]
    fn test_untextured_vertex_stage_has_no_tex_coord_input() {
        let (vertex, _) = render(false);

        assert!(!vertex.contains("in.tex_coord_0"));
        assert!(vertex.contains("fn vs_main"));
    }
}
