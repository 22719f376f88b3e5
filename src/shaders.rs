//! WGSL sources for the GPU passes.
//!
//! All three passes draw a single fullscreen triangle. `uv` runs from
//! (0, 0) at the bottom-left to (1, 1) at the top-right, so `uv * resolution`
//! is a fragment coordinate with the same origin as the CPU field. Texture
//! rows run top-down, hence the `1.0 - y` when sampling.

/// Fullscreen-triangle vertex stage, prepended to each fragment shader.
pub const FULLSCREEN_VERTEX: &str = r#"
struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> VertexOutput {
    var positions = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(3.0, -1.0),
        vec2<f32>(-1.0, 3.0),
    );
    let p = positions[vertex_index];

    var out: VertexOutput;
    out.clip_position = vec4<f32>(p, 0.0, 1.0);
    out.uv = p * 0.5 + 0.5;
    return out;
}
"#;

/// Simulation pass: previous field -> next field.
pub const FLUID_FRAGMENT: &str = r#"
struct FluidUniforms {
    resolution: vec2<f32>,
    time: f32,
    frame: u32,
    mouse: vec4<f32>,
    brush_size: f32,
    brush_strength: f32,
    fluid_decay: f32,
    trail_length: f32,
    stop_decay: f32,
    pointer_active: u32,
    _pad: vec2<f32>,
};

@group(0) @binding(0)
var prev_field: texture_2d<f32>;
@group(0) @binding(1)
var field_sampler: sampler;
@group(0) @binding(2)
var<uniform> uniforms: FluidUniforms;

fn field_uv(p: vec2<f32>) -> vec2<f32> {
    let q = fract(p / uniforms.resolution);
    return vec2<f32>(q.x, 1.0 - q.y);
}

fn t(p: vec2<f32>) -> vec4<f32> {
    return textureSampleLevel(prev_field, field_sampler, field_uv(p), 0.0);
}

fn segment_distance(p: vec2<f32>, a: vec2<f32>, b: vec2<f32>) -> f32 {
    let ab = b - a;
    let len_sq = dot(ab, ab);
    if (len_sq <= 1.0e-7) {
        return length(p - a);
    }
    let h = clamp(dot(p - a, ab) / len_sq, 0.0, 1.0);
    return length(p - a - ab * h);
}

fn triangle_area(a: vec2<f32>, b: vec2<f32>, c: vec2<f32>) -> f32 {
    let la = length(b - c);
    let lb = length(c - a);
    let lc = length(a - b);
    let s = 0.5 * (la + lb + lc);
    return sqrt(max(s * (s - la) * (s - lb) * (s - lc), 0.0));
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let res = uniforms.resolution;
    let coord = in.uv * res;

    if (uniforms.frame == 0u) {
        let wave = 0.5 + sin(0.2 * coord.x) * 0.5;
        let q = length(coord - 0.5 * res);
        let bump = 0.1 * exp(-0.001 * q * q);
        return clamp(vec4<f32>(0.0, 0.0, bump, wave), vec4<f32>(-0.4), vec4<f32>(0.4));
    }

    var v = coord;
    var a = coord + vec2<f32>(1.0, 1.0);
    var b = coord + vec2<f32>(1.0, -1.0);
    var c = coord + vec2<f32>(-1.0, 1.0);
    var d = coord + vec2<f32>(-1.0, -1.0);

    for (var i = 0; i < 8; i++) {
        v -= t(v).xy;
        a -= t(a).xy;
        b -= t(b).xy;
        c -= t(c).xy;
        d -= t(d).xy;
    }

    let center = t(v);
    let n = t(v + vec2<f32>(0.0, 1.0));
    let e = t(v + vec2<f32>(1.0, 0.0));
    let s = t(v - vec2<f32>(0.0, 1.0));
    let w = t(v - vec2<f32>(1.0, 0.0));
    let average = 0.25 * (n + e + s + w);

    var me = mix(center, average, vec4<f32>(0.15, 0.15, 0.95, 0.0));
    me.z -= 0.01 * ((triangle_area(a, b, c) + triangle_area(b, c, d)) - 4.0);

    let push = 100.0 * vec2<f32>(e.z - w.z, n.z - s.z) / res;
    me.x += push.x;
    me.y += push.y;

    me.x *= uniforms.fluid_decay;
    me.y *= uniforms.fluid_decay;
    me.z *= uniforms.trail_length;

    if (uniforms.pointer_active != 0u) {
        let pos = uniforms.mouse.xy;
        let prev = uniforms.mouse.zw;
        var m = pos - prev;
        let speed = length(m);
        let q = segment_distance(coord, pos, prev);
        if (speed > 0.0) {
            m = min(speed, 10.0) * m / speed;
        }

        let size_factor = 1.0e-4 / uniforms.brush_size;
        let amount = 0.03 * uniforms.brush_strength * sqrt(exp(-size_factor * q * q * q));
        me += amount * vec4<f32>(m, 10.0, 10.0);

        if (speed < 2.0) {
            let influence = exp(-length(coord - pos) * 0.01);
            let cursor_decay = mix(1.0, uniforms.stop_decay, influence);
            me.x *= cursor_decay;
            me.y *= cursor_decay;
            me.z *= cursor_decay;
        }
    }

    return clamp(me, vec4<f32>(-0.4), vec4<f32>(0.4));
}
"#;

/// Compositing pass: field -> surface colour.
pub const DISPLAY_FRAGMENT: &str = r#"
struct DisplayUniforms {
    resolution: vec2<f32>,
    time: f32,
    distortion: f32,
    color1: vec4<f32>,
    color2: vec4<f32>,
    color3: vec4<f32>,
    color4: vec4<f32>,
    intensity: f32,
    softness: f32,
    _pad: vec2<f32>,
};

@group(0) @binding(0)
var fluid: texture_2d<f32>;
@group(0) @binding(1)
var fluid_sampler: sampler;
@group(0) @binding(2)
var<uniform> uniforms: DisplayUniforms;

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let res = uniforms.resolution;
    let frag = in.uv * res;
    let velocity = textureSampleLevel(fluid, fluid_sampler, vec2<f32>(in.uv.x, 1.0 - in.uv.y), 0.0).xy;

    let mr = min(res.x, res.y);
    let uv = (frag * 2.0 - res) / mr + velocity * (0.5 * uniforms.distortion);

    var d = -uniforms.time * 0.5;
    var a = 0.0;
    for (var i = 0.0; i < 8.0; i += 1.0) {
        a += cos(i - d - a * uv.x);
        d += sin(uv.y * i + a);
    }
    d += uniforms.time * 0.5;

    let smooth_amount = clamp(uniforms.softness * 0.1, 0.0, 0.9);
    let m1 = mix(cos(uv.x * d) * 0.5 + 0.5, 0.5, smooth_amount);
    let m2 = mix(cos(uv.y * a) * 0.5 + 0.5, 0.5, smooth_amount);
    let m3 = mix(sin(d + a) * 0.5 + 0.5, 0.5, smooth_amount);

    var col = mix(uniforms.color1.rgb, uniforms.color2.rgb, m1);
    col = mix(col, uniforms.color3.rgb, m2);
    col = mix(col, uniforms.color4.rgb, m3 * 0.4);

    return vec4<f32>(col * uniforms.intensity, 1.0);
}
"#;

/// Fractal glass pass: image + eased pointer -> surface colour.
pub const GLASS_FRAGMENT: &str = r#"
struct GlassUniforms {
    resolution: vec2<f32>,
    texture_size: vec2<f32>,
    mouse: vec2<f32>,
    parallax_strength: f32,
    distortion_multiplier: f32,
    glass_strength: f32,
    stripes_frequency: f32,
    glass_smoothness: f32,
    edge_padding: f32,
};

@group(0) @binding(0)
var glass_image: texture_2d<f32>;
@group(0) @binding(1)
var image_sampler: sampler;
@group(0) @binding(2)
var<uniform> uniforms: GlassUniforms;

fn cover_uv(uv: vec2<f32>, texture_size: vec2<f32>) -> vec2<f32> {
    if (texture_size.x < 1.0 || texture_size.y < 1.0) {
        return uv;
    }
    let s = uniforms.resolution / texture_size;
    let scale = max(s.x, s.y);
    let scaled = texture_size * scale;
    let offset = (uniforms.resolution - scaled) * 0.5;
    return (uv * uniforms.resolution - offset) / scaled;
}

fn displacement(x: f32, stripes: f32, strength: f32) -> f32 {
    let modulus = 1.0 / stripes;
    return (x - modulus * floor(x / modulus)) * strength;
}

fn fractal_glass(x: f32) -> f32 {
    var d = 0.0;
    for (var i = -5; i <= 5; i++) {
        d += displacement(x + f32(i) * uniforms.glass_smoothness, uniforms.stripes_frequency, uniforms.glass_strength);
    }
    return x + d / 11.0;
}

fn smooth_edge(x: f32, padding: f32) -> f32 {
    if (x < padding) {
        return smoothstep(0.0, padding, x);
    }
    if (x > 1.0 - padding) {
        return 1.0 - smoothstep(1.0 - padding, 1.0, x);
    }
    return 1.0;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    var uv = in.uv;
    let base_x = uv.x;
    let edge = smooth_edge(base_x, uniforms.edge_padding);

    uv.x = mix(base_x, fractal_glass(base_x), edge);
    let distortion = uv.x - base_x;

    let direction = -sign(0.5 - uniforms.mouse.x);
    let parallax = direction * abs(uniforms.mouse.x - 0.5) * uniforms.parallax_strength
        * (1.0 + abs(distortion) * uniforms.distortion_multiplier);
    uv.x += parallax * edge;

    let cover = clamp(cover_uv(uv, uniforms.texture_size), vec2<f32>(0.0), vec2<f32>(1.0));
    return textureSampleLevel(glass_image, image_sampler, vec2<f32>(cover.x, 1.0 - cover.y), 0.0);
}
"#;

/// Full WGSL module for a fragment stage: vertex prelude + fragment source.
pub fn module_source(fragment: &str) -> String {
    format!("{}\n{}", FULLSCREEN_VERTEX, fragment)
}
