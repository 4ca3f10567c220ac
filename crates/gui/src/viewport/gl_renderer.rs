use glow::HasContext;

use super::camera::{FlyCamera, FogRange};
use super::debug_draw::{DebugDraw, VERTEX_FLOATS};

// ── Render parameters ────────────────────────────────────────

/// Per-frame camera state copied into the paint callback
pub struct RenderParams {
    /// Viewport rectangle [x, y, width, height] in pixels
    pub viewport: [f32; 4],
    pub view: glam::Mat4,
    pub proj: glam::Mat4,
    pub fog: FogRange,
    /// Background and fog color RGB
    pub bg_color: [u8; 3],
}

impl RenderParams {
    pub fn new(camera: &FlyCamera, viewport: [f32; 4], bg_color: [u8; 3]) -> Self {
        let vp = super::picking::Viewport::new(viewport[2], viewport[3]);
        Self {
            viewport,
            view: camera.view_matrix(),
            proj: camera.projection_matrix(&vp),
            fog: camera.fog,
            bg_color,
        }
    }
}

/// Packed vertex arrays for one frame
#[derive(Default)]
pub struct FrameGeometry {
    pub triangles: Vec<f32>,
    pub lines: Vec<f32>,
    pub points: Vec<f32>,
}

impl FrameGeometry {
    pub fn from_draw(dd: &DebugDraw) -> Self {
        Self {
            triangles: dd.pack_triangles(),
            lines: dd.pack_lines(),
            points: dd.pack_points(),
        }
    }
}

// ── GPU stream buffers ───────────────────────────────────────

/// Vertex array re-filled every frame
struct GpuStream {
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    vertex_count: i32,
}

// ── Main GL renderer ─────────────────────────────────────────

pub struct GlRenderer {
    program: glow::Program,
    triangles: GpuStream,
    lines: GpuStream,
    points: GpuStream,
}

impl GlRenderer {
    pub fn new(gl: &glow::Context) -> Result<Self, String> {
        let program = compile_program(gl, DEBUG_VERT, DEBUG_FRAG)?;
        Ok(Self {
            program,
            triangles: create_stream(gl)?,
            lines: create_stream(gl)?,
            points: create_stream(gl)?,
        })
    }

    /// Replace the streamed vertex data
    pub fn upload(&mut self, gl: &glow::Context, frame: &FrameGeometry) {
        upload_stream(gl, &mut self.triangles, &frame.triangles);
        upload_stream(gl, &mut self.lines, &frame.lines);
        upload_stream(gl, &mut self.points, &frame.points);
    }

    /// Render the uploaded primitives
    pub fn paint(&self, gl: &glow::Context, params: &RenderParams) {
        let mvp = params.proj * params.view;

        unsafe {
            gl.viewport(
                params.viewport[0] as i32,
                params.viewport[1] as i32,
                params.viewport[2] as i32,
                params.viewport[3] as i32,
            );
            gl.scissor(
                params.viewport[0] as i32,
                params.viewport[1] as i32,
                params.viewport[2] as i32,
                params.viewport[3] as i32,
            );
            gl.enable(glow::SCISSOR_TEST);

            let bg = params.bg_color.map(|c| c as f32 / 255.0);
            gl.clear_color(bg[0], bg[1], bg[2], 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);

            gl.enable(glow::DEPTH_TEST);
            gl.depth_func(glow::LEQUAL);
            gl.enable(glow::BLEND);
            gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
            gl.enable(glow::PROGRAM_POINT_SIZE);

            gl.use_program(Some(self.program));
            set_uniform_mat4(gl, self.program, "u_mvp", &mvp);
            set_uniform_mat4(gl, self.program, "u_view", &params.view);
            set_uniform_vec3(gl, self.program, "u_fog_color", bg);
            set_uniform_f32(gl, self.program, "u_fog_start", params.fog.start);
            set_uniform_f32(gl, self.program, "u_fog_end", params.fog.end);

            // Lift lines off coplanar surfaces
            gl.enable(glow::POLYGON_OFFSET_FILL);
            gl.polygon_offset(1.0, 1.0);
            draw_stream(gl, &self.triangles, glow::TRIANGLES);
            gl.disable(glow::POLYGON_OFFSET_FILL);

            draw_stream(gl, &self.lines, glow::LINES);
            draw_stream(gl, &self.points, glow::POINTS);

            gl.disable(glow::PROGRAM_POINT_SIZE);
            gl.disable(glow::BLEND);
            gl.disable(glow::DEPTH_TEST);
            gl.disable(glow::SCISSOR_TEST);
            gl.use_program(None);
        }
    }

    pub fn destroy(&self, gl: &glow::Context) {
        unsafe {
            gl.delete_program(self.program);
            for stream in [&self.triangles, &self.lines, &self.points] {
                gl.delete_vertex_array(stream.vao);
                gl.delete_buffer(stream.vbo);
            }
        }
    }
}

// ── GPU upload ───────────────────────────────────────────────

fn create_stream(gl: &glow::Context) -> Result<GpuStream, String> {
    unsafe {
        let vao = gl.create_vertex_array()?;
        gl.bind_vertex_array(Some(vao));

        let vbo = gl.create_buffer()?;
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));

        let stride = (VERTEX_FLOATS * 4) as i32;
        // position: location 0
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);
        // color: location 1
        gl.enable_vertex_attrib_array(1);
        gl.vertex_attrib_pointer_f32(1, 4, glow::FLOAT, false, stride, 3 * 4);
        // point size: location 2
        gl.enable_vertex_attrib_array(2);
        gl.vertex_attrib_pointer_f32(2, 1, glow::FLOAT, false, stride, 7 * 4);

        gl.bind_vertex_array(None);

        Ok(GpuStream {
            vao,
            vbo,
            vertex_count: 0,
        })
    }
}

fn upload_stream(gl: &glow::Context, stream: &mut GpuStream, vertices: &[f32]) {
    unsafe {
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(stream.vbo));
        gl.buffer_data_u8_slice(
            glow::ARRAY_BUFFER,
            bytemuck_cast_slice(vertices),
            glow::STREAM_DRAW,
        );
        gl.bind_buffer(glow::ARRAY_BUFFER, None);
    }
    stream.vertex_count = (vertices.len() / VERTEX_FLOATS) as i32;
}

// ── Draw calls ───────────────────────────────────────────────

unsafe fn draw_stream(gl: &glow::Context, stream: &GpuStream, mode: u32) {
    if stream.vertex_count == 0 {
        return;
    }
    gl.bind_vertex_array(Some(stream.vao));
    gl.draw_arrays(mode, 0, stream.vertex_count);
    gl.bind_vertex_array(None);
}

// ── Shader compilation ───────────────────────────────────────

fn compile_program(gl: &glow::Context, vert_src: &str, frag_src: &str) -> Result<glow::Program, String> {
    unsafe {
        let program = gl.create_program()?;

        let vert = gl.create_shader(glow::VERTEX_SHADER)?;
        gl.shader_source(vert, vert_src);
        gl.compile_shader(vert);
        if !gl.get_shader_compile_status(vert) {
            let log = gl.get_shader_info_log(vert);
            tracing::error!("Vertex shader error: {log}");
        }

        let frag = gl.create_shader(glow::FRAGMENT_SHADER)?;
        gl.shader_source(frag, frag_src);
        gl.compile_shader(frag);
        if !gl.get_shader_compile_status(frag) {
            let log = gl.get_shader_info_log(frag);
            tracing::error!("Fragment shader error: {log}");
        }

        gl.attach_shader(program, vert);
        gl.attach_shader(program, frag);
        gl.link_program(program);
        let linked = gl.get_program_link_status(program);

        gl.delete_shader(vert);
        gl.delete_shader(frag);

        if linked {
            Ok(program)
        } else {
            let log = gl.get_program_info_log(program);
            gl.delete_program(program);
            Err(format!("Program link error: {log}"))
        }
    }
}

// ── Uniform setters ──────────────────────────────────────────

fn set_uniform_mat4(gl: &glow::Context, program: glow::Program, name: &str, mat: &glam::Mat4) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_matrix_4_f32_slice(loc.as_ref(), false, &mat.to_cols_array());
    }
}

fn set_uniform_vec3(gl: &glow::Context, program: glow::Program, name: &str, v: [f32; 3]) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_3_f32(loc.as_ref(), v[0], v[1], v[2]);
    }
}

fn set_uniform_f32(gl: &glow::Context, program: glow::Program, name: &str, v: f32) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_1_f32(loc.as_ref(), v);
    }
}

// ── Byte cast helper ─────────────────────────────────────────

fn bytemuck_cast_slice<T: Copy>(slice: &[T]) -> &[u8] {
    unsafe {
        std::slice::from_raw_parts(
            slice.as_ptr() as *const u8,
            std::mem::size_of_val(slice),
        )
    }
}

// ── Shaders ──────────────────────────────────────────────────

const DEBUG_VERT: &str = r#"#version 330 core
uniform mat4 u_mvp;
uniform mat4 u_view;

layout(location = 0) in vec3 a_position;
layout(location = 1) in vec4 a_color;
layout(location = 2) in float a_size;

out vec4 v_color;
out float v_dist;

void main() {
    gl_Position = u_mvp * vec4(a_position, 1.0);
    gl_PointSize = a_size;
    v_color = a_color;
    v_dist = length((u_view * vec4(a_position, 1.0)).xyz);
}
"#;

const DEBUG_FRAG: &str = r#"#version 330 core
uniform vec3 u_fog_color;
uniform float u_fog_start;
uniform float u_fog_end;

in vec4 v_color;
in float v_dist;

out vec4 frag_color;

void main() {
    float fog = clamp((v_dist - u_fog_start) / max(u_fog_end - u_fog_start, 0.0001), 0.0, 1.0);
    frag_color = vec4(mix(v_color.rgb, u_fog_color, fog), v_color.a);
}
"#;
