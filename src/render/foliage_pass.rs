use web_sys::{WebGl2RenderingContext, WebGlBuffer, WebGlProgram, WebGlUniformLocation, WebGlVertexArrayObject};
use crate::math::Mat4;
use crate::particles::foliage::ATTRIBUTE_STRIDE;
use crate::particles::{FoliageField, FoliageShade};
use super::shaders::{FOLIAGE_FRAGMENT_SHADER, FOLIAGE_VERTEX_SHADER};
use super::webgl::WebGLContext;

/// One float attribute inside the interleaved foliage buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoliageAttribute {
    pub name: &'static str,
    pub location: u32,
    pub size: i32,
    /// Offset in floats from the start of a particle's record
    pub offset: usize,
}

/// Layout of `FoliageField::attribute_data`
pub const FOLIAGE_ATTRIBUTES: [FoliageAttribute; 4] = [
    FoliageAttribute { name: "a_scatter", location: 0, size: 3, offset: 0 },
    FoliageAttribute { name: "a_tree", location: 1, size: 3, offset: 3 },
    FoliageAttribute { name: "a_random", location: 2, size: 1, offset: 6 },
    FoliageAttribute { name: "a_size", location: 3, size: 1, offset: 7 },
];

/// Upper bound for the device pixel ratio fed to point sizing
pub const MAX_PIXEL_RATIO: f32 = 2.0;

/// Cached uniform locations for the foliage program
struct FoliageUniforms {
    model: Option<WebGlUniformLocation>,
    view: Option<WebGlUniformLocation>,
    projection: Option<WebGlUniformLocation>,
    time: Option<WebGlUniformLocation>,
    progress: Option<WebGlUniformLocation>,
    pixel_ratio: Option<WebGlUniformLocation>,
    color_center: Option<WebGlUniformLocation>,
    color_rim: Option<WebGlUniformLocation>,
}

/// Per-draw camera and timing inputs
#[derive(Debug, Clone, Copy)]
pub struct FoliageDraw<'a> {
    pub time: f32,
    pub progress: f32,
    pub pixel_ratio: f32,
    pub model: &'a Mat4,
    pub view: &'a [f32],
    pub projection: &'a [f32],
}

/// GPU path for the foliage field
///
/// Static attributes are uploaded once; each frame only the shared uniforms
/// change, and the vertex program computes every needle position.
pub struct FoliagePass {
    ctx: WebGLContext,
    program: WebGlProgram,
    uniforms: FoliageUniforms,
    vao: WebGlVertexArrayObject,
    // Kept alive for the VAO's lifetime
    _buffer: WebGlBuffer,
    count: i32,
    shade: FoliageShade,
}

impl FoliagePass {
    pub fn new(gl: WebGl2RenderingContext, field: &FoliageField, shade: FoliageShade) -> Result<Self, String> {
        let ctx = WebGLContext::new(gl);
        let program = ctx.create_program(FOLIAGE_VERTEX_SHADER, FOLIAGE_FRAGMENT_SHADER)?;

        let uniforms = FoliageUniforms {
            model: ctx.get_uniform_location(&program, "u_model"),
            view: ctx.get_uniform_location(&program, "u_view"),
            projection: ctx.get_uniform_location(&program, "u_projection"),
            time: ctx.get_uniform_location(&program, "u_time"),
            progress: ctx.get_uniform_location(&program, "u_progress"),
            pixel_ratio: ctx.get_uniform_location(&program, "u_pixel_ratio"),
            color_center: ctx.get_uniform_location(&program, "u_color_center"),
            color_rim: ctx.get_uniform_location(&program, "u_color_rim"),
        };

        let data = field.attribute_data();
        let vao = ctx.create_vao()?;
        ctx.gl.bind_vertex_array(Some(&vao));

        let buffer = ctx.create_buffer_f32(&data, WebGl2RenderingContext::STATIC_DRAW)?;
        ctx.gl.bind_buffer(WebGl2RenderingContext::ARRAY_BUFFER, Some(&buffer));
        for attribute in FOLIAGE_ATTRIBUTES {
            ctx.float_attribute(attribute.location, attribute.size, ATTRIBUTE_STRIDE, attribute.offset);
        }

        ctx.gl.bind_vertex_array(None);
        ctx.gl.bind_buffer(WebGl2RenderingContext::ARRAY_BUFFER, None);

        log::info!("Foliage pass ready: {} needles on the GPU", field.count());

        Ok(Self {
            ctx,
            program,
            uniforms,
            vao,
            _buffer: buffer,
            count: (data.len() / ATTRIBUTE_STRIDE) as i32,
            shade,
        })
    }

    /// Draw every needle into whatever framebuffer the host has bound
    pub fn draw(&self, frame: &FoliageDraw) {
        if self.count == 0 {
            return;
        }
        let ctx = &self.ctx;

        ctx.gl.use_program(Some(&self.program));
        ctx.begin_additive_pass();

        ctx.uniform_matrix4fv(self.uniforms.model.as_ref(), frame.model.as_slice());
        ctx.uniform_matrix4fv(self.uniforms.view.as_ref(), frame.view);
        ctx.uniform_matrix4fv(self.uniforms.projection.as_ref(), frame.projection);
        ctx.uniform_1f(self.uniforms.time.as_ref(), frame.time);
        ctx.uniform_1f(self.uniforms.progress.as_ref(), frame.progress);
        ctx.uniform_1f(self.uniforms.pixel_ratio.as_ref(), frame.pixel_ratio.min(MAX_PIXEL_RATIO));

        let center = self.shade.center;
        let rim = self.shade.rim;
        ctx.uniform_3f(self.uniforms.color_center.as_ref(), center.x, center.y, center.z);
        ctx.uniform_3f(self.uniforms.color_rim.as_ref(), rim.x, rim.y, rim.z);

        ctx.gl.bind_vertex_array(Some(&self.vao));
        ctx.gl.draw_arrays(WebGl2RenderingContext::POINTS, 0, self.count);

        ctx.end_additive_pass();
    }

    pub fn count(&self) -> usize {
        self.count as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_fills_stride() {
        let total: i32 = FOLIAGE_ATTRIBUTES.iter().map(|a| a.size).sum();
        assert_eq!(total as usize, ATTRIBUTE_STRIDE);

        let mut expected_offset = 0;
        for attribute in FOLIAGE_ATTRIBUTES.iter() {
            assert_eq!(attribute.offset, expected_offset);
            expected_offset += attribute.size as usize;
        }
    }

    #[test]
    fn test_layout_matches_attribute_data() {
        use crate::math::Vec3;
        use crate::particles::FoliageParticle;

        let particle = FoliageParticle {
            scatter: Vec3::new(1.0, 2.0, 3.0),
            tree: Vec3::new(4.0, 5.0, 6.0),
            random: 0.25,
            size: 0.75,
        };
        let field = FoliageField::from_particles(vec![particle], 1.5);
        let data = field.attribute_data();

        let read = |name: &str| {
            let a = FOLIAGE_ATTRIBUTES.iter().find(|a| a.name == name).unwrap();
            data[a.offset..a.offset + a.size as usize].to_vec()
        };
        assert_eq!(read("a_scatter"), vec![1.0, 2.0, 3.0]);
        assert_eq!(read("a_tree"), vec![4.0, 5.0, 6.0]);
        assert_eq!(read("a_random"), vec![0.25]);
        assert_eq!(read("a_size"), vec![0.75]);
    }
}
