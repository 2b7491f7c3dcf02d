//! GLSL programs for the foliage point field
//!
//! The vertex program repeats the CPU math in `particles::foliage` so the
//! GPU path and the CPU batch place every needle identically.

/// Vertex shader for foliage needles
pub const FOLIAGE_VERTEX_SHADER: &str = r#"#version 300 es
precision highp float;

layout(location = 0) in vec3 a_scatter;
layout(location = 1) in vec3 a_tree;
layout(location = 2) in float a_random;
layout(location = 3) in float a_size;

uniform mat4 u_model;
uniform mat4 u_view;
uniform mat4 u_projection;
uniform float u_time;
uniform float u_progress;
uniform float u_pixel_ratio;

out float v_random;

float ease(float t) {
    t = clamp(t, 0.0, 1.0);
    if (t < 0.5) {
        return 4.0 * t * t * t;
    }
    float f = -2.0 * t + 2.0;
    return 1.0 - f * f * f / 2.0;
}

void main() {
    v_random = a_random;

    // Stagger starts by the particle's random value
    float local_progress = clamp((u_progress - a_random * 0.2) / 0.8, 0.0, 1.0);
    vec3 pos = mix(a_scatter, a_tree, ease(local_progress));

    if (u_progress > 0.8) {
        float breathe = sin(u_time * 1.5 + a_random * 10.0) * 0.05;
        pos.x += breathe;
        pos.z += breathe;
    }

    if (u_progress > 0.1 && u_progress < 0.9) {
        float angle = sin(u_progress * 3.14159265) * 5.0 * (1.0 - a_random);
        float c = cos(angle);
        float s = sin(angle);
        pos = vec3(pos.x * c - pos.z * s, pos.y, pos.x * s + pos.z * c);
    }

    vec4 view_pos = u_view * u_model * vec4(pos, 1.0);
    gl_Position = u_projection * view_pos;

    float twinkle = 0.8 + 0.2 * sin(u_time * 2.0 + a_random * 100.0);
    gl_PointSize = (a_size * 40.0 * u_pixel_ratio) / -view_pos.z * twinkle;
}
"#;

/// Fragment shader for foliage needles: emerald core with a gold rim
pub const FOLIAGE_FRAGMENT_SHADER: &str = r#"#version 300 es
precision highp float;

in float v_random;

uniform vec3 u_color_center;
uniform vec3 u_color_rim;

out vec4 fragColor;

void main() {
    float dist = length(gl_PointCoord - vec2(0.5));
    if (dist > 0.5) {
        discard;
    }

    vec3 color = mix(u_color_center, u_color_rim, smoothstep(0.35, 0.5, dist));

    if (v_random > 0.9) {
        color = mix(color, vec3(1.0), 0.5);
    }

    fragColor = vec4(pow(color, vec3(1.0 / 2.2)), 1.0);
}
"#;
