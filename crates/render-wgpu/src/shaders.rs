/// WGSL shader for the opaque cube.
pub const CUBE_SHADER: &str = r#"
struct Camera {
    view_proj: mat4x4<f32>,
    position: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> camera: Camera;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct InstanceInput {
    @location(3) model_0: vec4<f32>,
    @location(4) model_1: vec4<f32>,
    @location(5) model_2: vec4<f32>,
    @location(6) model_3: vec4<f32>,
    @location(7) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) color: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);
    let world_normal = (model * vec4<f32>(vertex.normal, 0.0)).xyz;

    var out: VertexOutput;
    out.clip_position = camera.view_proj * world_pos;
    out.world_position = world_pos.xyz;
    out.world_normal = normalize(world_normal);
    out.color = instance.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let normal = normalize(in.world_normal);
    let ambient = 0.1;

    // White key light from the upper right.
    let key_dir = normalize(vec3<f32>(10.0, 10.0, 5.0));
    let key = max(dot(normal, key_dir), 0.0) * 1.5;

    // Dim green fill light with linear falloff to 20 units.
    let to_fill = vec3<f32>(-10.0, -5.0, -5.0) - in.world_position;
    let fill_falloff = clamp(1.0 - length(to_fill) / 20.0, 0.0, 1.0);
    let fill = max(dot(normal, normalize(to_fill)), 0.0) * 0.5 * fill_falloff;

    // Metallic look: a tight specular on top of the dark base.
    let view_dir = normalize(camera.position.xyz - in.world_position);
    let half_dir = normalize(key_dir + view_dir);
    let spec = pow(max(dot(normal, half_dir), 0.0), 48.0) * 0.8;

    let lit = in.color.rgb * (ambient + key)
        + vec3<f32>(0.33, 1.0, 0.33) * fill * in.color.rgb
        + vec3<f32>(spec);
    return vec4<f32>(lit, in.color.a);
}
"#;

/// WGSL shader for the energy shield.
///
/// Mirrors `borgshield_render::shield::shade`: fresnel rim, five expanding
/// rings, a uv grid, alpha clamped, colour mix left unclamped.
pub const SHIELD_SHADER: &str = r#"
struct Camera {
    view_proj: mat4x4<f32>,
    position: vec4<f32>,
};

struct Shield {
    model: mat4x4<f32>,
    base_color: vec4<f32>,
    rim_color: vec4<f32>,
    // x = seconds since scene start
    params: vec4<f32>,
    // xyz = impact position, w = impact time
    hits: array<vec4<f32>, 5>,
};

@group(0) @binding(0)
var<uniform> camera: Camera;

@group(1) @binding(0)
var<uniform> shield: Shield;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

@vertex
fn vs_shield(vertex: VertexInput) -> VertexOutput {
    let world_pos = shield.model * vec4<f32>(vertex.position, 1.0);

    var out: VertexOutput;
    out.clip_position = camera.view_proj * world_pos;
    out.world_position = world_pos.xyz;
    out.world_normal = normalize((shield.model * vec4<f32>(vertex.normal, 0.0)).xyz);
    out.uv = vertex.uv;
    return out;
}

@fragment
fn fs_shield(in: VertexOutput) -> @location(0) vec4<f32> {
    let view_dir = normalize(camera.position.xyz - in.world_position);
    let normal = normalize(in.world_normal);

    let rim_base = 1.0 - dot(view_dir, normal);
    let fresnel = rim_base * rim_base * rim_base;

    let time = shield.params.x;
    var ripple = 0.0;
    for (var i = 0u; i < 5u; i = i + 1u) {
        let hit = shield.hits[i];
        let since = time - hit.w;
        if (since > 0.0 && since < 2.0) {
            let dist = distance(in.world_position, hit.xyz);
            let radius = since * 2.0;
            if (dist > radius && dist < radius + 0.2) {
                ripple = ripple + (1.0 - since / 2.0) * 2.0;
            }
        }
    }

    let cell = fract(in.uv * 50.0);
    let grid = select(0.0, 1.0, cell.x > 0.98) + select(0.0, 1.0, cell.y > 0.98);

    let alpha = clamp(fresnel * 0.4 + ripple * 0.5 + grid * 0.1, 0.0, 1.0);
    let color = mix(shield.base_color.rgb, shield.rim_color.rgb, vec3<f32>(fresnel + ripple));
    return vec4<f32>(color, alpha);
}
"#;

/// WGSL shader for the starfield points.
pub const STAR_SHADER: &str = r#"
struct Camera {
    view_proj: mat4x4<f32>,
    position: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> camera: Camera;

struct StarVertex {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
};

struct StarOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_star(vertex: StarVertex) -> StarOutput {
    var out: StarOutput;
    out.clip_position = camera.view_proj * vec4<f32>(vertex.position, 1.0);
    out.color = vertex.color;
    return out;
}

@fragment
fn fs_star(in: StarOutput) -> @location(0) vec4<f32> {
    return in.color;
}
"#;
