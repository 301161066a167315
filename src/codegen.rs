//! Per-engine code generation
//!
//! Turns a typed invocation into a code string for the active engine.
//! Best-effort: an action with no template for the target comes
//! back as a tagged [`GeneratedCode::Stub`], never an error, and an
//! unrecognized engine gets the generic structural-comment renderer.

use serde::Serialize;

use crate::catalog::Action;

/// Which template table to render with, resolved from the engine name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineTarget {
    Kaplay,
    Custom,
    Generic,
}

impl EngineTarget {
    /// Case-insensitive match on the engine name; both the short id and
    /// the display name of the known engines are accepted.
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "kaplay" | "kaplay engine" => EngineTarget::Kaplay,
            "custom" | "motor propio" => EngineTarget::Custom,
            _ => EngineTarget::Generic,
        }
    }

}

/// Typed parameter payload for one command, built by the handlers and
/// consumed by the generators and the describer. Serializes as a bare
/// parameter object for the generic renderer and the export snapshot.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Invocation {
    CreateObject {
        name: String,
        #[serde(rename = "type")]
        kind: String,
        x: i64,
        y: i64,
    },
    InitializeObject {
        #[serde(rename = "type")]
        kind: String,
    },
    CloneObject { source: String, name: String },
    MoveObject { name: String, x: i64, y: i64 },
    TeleportObject { name: String, x: i64, y: i64 },
    CenterObject { name: String },
    RotateObject { name: String, angle: i64 },
    ScaleObject { name: String, scale: f64 },
    SetColor { name: String, color: String },
    SetSize { name: String, width: i64, height: i64 },
    SetSprite { name: String, sprite: String },
    SetOpacity { name: String, opacity: f64 },
    HideObject { name: String },
    ShowObject { name: String },
    BlinkObject { name: String },
    AddGravity { name: String },
    SetVelocity { name: String, velocity: i64 },
    JumpObject { name: String },
    PushObject { name: String, direction: String },
    SetFriction { name: String, friction: f64 },
    SetBounce { name: String, bounce: f64 },
    SetMass { name: String, mass: i64 },
    StopObject { name: String },
    BindKey { key: String, action: String, object: String },
    BindClick { object: String, action: String },
    MakeDraggable { name: String },
    FollowMouse { name: String },
    OnCollision { object1: String, object2: String, action: String },
    DetectNear { object1: String, object2: String },
    PlaySound { sound: String },
    PlayMusic {
        music: String,
        #[serde(rename = "loop")]
        looped: bool,
    },
    StopSound {},
    SetVolume { volume: i64 },
    Mute {},
    GoToScene { scene: String },
    RestartScene {},
    PauseGame {},
    ResumeGame {},
    CameraFollow { object: String },
    SetZoom { zoom: f64 },
    SetCameraPosition { x: i64, y: i64 },
    CenterCamera {},
    ShakeCamera {},
    AddEffect { effect: String, name: String },
    CreateParticles {
        #[serde(rename = "type")]
        kind: String,
        x: i64,
        y: i64,
    },
    CreateExplosion { x: i64, y: i64 },
    FlashObject { name: String },
    FadeOut { name: String },
    FadeIn { name: String },
    SetVariable { name: String, value: i64 },
    IfCondition { variable: String, threshold: i64, action: String },
    Repeat { count: i64, action: String },
    SetInterval { seconds: i64, action: String },
    Wait { seconds: i64 },
    DestroyObject { name: String },
    InitGame {},
    StartGame {},
    EndGame {},
    AddScore { amount: i64 },
    AddLife { amount: i64 },
    RemoveLife { amount: i64 },
    SaveGame {},
    LoadGame {},
}

/// Outcome of code generation. A `Stub` still renders to a comment string,
/// but callers can tell "rendered" from "not implemented" without parsing.
/// The generic renderer never stubs, so only the engines with template
/// tables carry a stub label.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedCode {
    Rendered(String),
    Stub { action: Action, engine: &'static str },
}

impl GeneratedCode {
    pub fn is_rendered(&self) -> bool {
        matches!(self, GeneratedCode::Rendered(_))
    }

    /// The code string handed to callers and the execution hook.
    pub fn into_code(self) -> String {
        match self {
            GeneratedCode::Rendered(code) => code,
            GeneratedCode::Stub { action, engine } => {
                format!("// Acción {action} no implementada para {engine}")
            }
        }
    }
}

/// Template key an action renders under. A couple of actions delegate to
/// another action's templates, so stubs and the generic renderer report
/// the delegated name.
fn template_action(action: Action) -> Action {
    match action {
        Action::InitializeObject => Action::InitGame,
        Action::SetPosition => Action::MoveObject,
        other => other,
    }
}

/// Render an invocation for the target engine. `action` is the identifier
/// the matched rule reported; it only shows up in stub comments and the
/// generic renderer.
pub fn generate(action: Action, invocation: &Invocation, target: EngineTarget) -> GeneratedCode {
    let action = template_action(action);
    match target {
        EngineTarget::Kaplay => generate_kaplay(action, invocation),
        EngineTarget::Custom => generate_custom(action, invocation),
        EngineTarget::Generic => generate_generic(action, invocation),
    }
}

fn generate_kaplay(action: Action, invocation: &Invocation) -> GeneratedCode {
    let code = match invocation {
        Invocation::CreateObject { name, kind, x, y } => format!(
            "const {name} = add([\n    sprite(\"{kind}\"),\n    pos({x}, {y}),\n    area(),\n    body()\n]);"
        ),
        Invocation::MoveObject { name, x, y } => format!("{name}.pos = vec2({x}, {y});"),
        Invocation::SetColor { name, color } => {
            format!("{name}.color = Color.{};", color.to_uppercase())
        }
        Invocation::AddGravity { name } => format!("{name}.use(body());"),
        Invocation::PlaySound { sound } => format!("play(\"{sound}\");"),
        Invocation::GoToScene { scene } => format!("go(\"{scene}\");"),
        Invocation::BindKey { key, action, object } => format!(
            "onKeyPress(\"{key}\", () => {{\n    {object}.{action}();\n}});"
        ),
        Invocation::OnCollision { object1, object2, action } => format!(
            "{object1}.onCollide(\"{object2}\", () => {{\n    {action}();\n}});"
        ),
        Invocation::SetZoom { zoom } => format!("camScale({zoom});"),
        Invocation::CameraFollow { object } => format!(
            "{object}.onUpdate(() => {{\n    camPos({object}.pos);\n}});"
        ),
        _ => return GeneratedCode::Stub { action, engine: "Kaplay" },
    };
    GeneratedCode::Rendered(code)
}

fn generate_custom(action: Action, invocation: &Invocation) -> GeneratedCode {
    let code = match invocation {
        Invocation::CreateObject { name, kind, x, y } => format!(
            "const {name} = engine.createObject({{\n    type: \"{kind}\",\n    x: {x},\n    y: {y}\n}});"
        ),
        Invocation::MoveObject { name, x, y } => format!("{name}.setPosition({x}, {y});"),
        Invocation::SetColor { name, color } => format!("{name}.setColor(\"{color}\");"),
        Invocation::AddGravity { name } => format!("{name}.addComponent(\"gravity\");"),
        Invocation::PlaySound { sound } => format!("engine.audio.play(\"{sound}\");"),
        Invocation::GoToScene { scene } => format!("engine.scene.load(\"{scene}\");"),
        _ => return GeneratedCode::Stub { action, engine: "motor custom" },
    };
    GeneratedCode::Rendered(code)
}

/// Structural comment with the action name and serialized parameters, for
/// engines without a template table.
fn generate_generic(action: Action, invocation: &Invocation) -> GeneratedCode {
    let params = serde_json::to_string(invocation).unwrap_or_else(|_| "{}".to_string());
    GeneratedCode::Rendered(format!("// {action}({params})"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_caja() -> Invocation {
        Invocation::CreateObject { name: "caja".into(), kind: "caja".into(), x: 100, y: 200 }
    }

    #[test]
    fn engine_name_dispatch_is_case_insensitive() {
        assert_eq!(EngineTarget::from_name("Kaplay"), EngineTarget::Kaplay);
        assert_eq!(EngineTarget::from_name("KAPLAY ENGINE"), EngineTarget::Kaplay);
        assert_eq!(EngineTarget::from_name("Motor Propio"), EngineTarget::Custom);
        assert_eq!(EngineTarget::from_name("phaser"), EngineTarget::Generic);
    }

    #[test]
    fn kaplay_renders_its_templates() {
        let code = generate(Action::CreateObject, &create_caja(), EngineTarget::Kaplay);
        assert!(code.is_rendered());
        let code = code.into_code();
        assert!(code.contains("sprite(\"caja\")"));
        assert!(code.contains("pos(100, 200)"));

        let color = Invocation::SetColor { name: "jugador".into(), color: "red".into() };
        let code = generate(Action::SetColor, &color, EngineTarget::Kaplay).into_code();
        assert_eq!(code, "jugador.color = Color.RED;");
    }

    #[test]
    fn custom_renders_its_templates() {
        let code = generate(Action::CreateObject, &create_caja(), EngineTarget::Custom).into_code();
        assert!(code.contains("engine.createObject("));
        assert!(code.contains("type: \"caja\""));

        let mv = Invocation::MoveObject { name: "jugador".into(), x: 300, y: 400 };
        let code = generate(Action::MoveObject, &mv, EngineTarget::Custom).into_code();
        assert_eq!(code, "jugador.setPosition(300, 400);");
    }

    #[test]
    fn missing_template_is_a_tagged_stub() {
        let jump = Invocation::JumpObject { name: "jugador".into() };
        let out = generate(Action::JumpObject, &jump, EngineTarget::Custom);
        assert!(!out.is_rendered());
        assert_eq!(
            out.into_code(),
            "// Acción jumpObject no implementada para motor custom"
        );

        let shake = Invocation::ShakeCamera {};
        let out = generate(Action::ShakeCamera, &shake, EngineTarget::Kaplay);
        assert_eq!(
            out.into_code(),
            "// Acción shakeCamera no implementada para Kaplay"
        );
    }

    #[test]
    fn initialize_object_renders_under_the_init_game_key() {
        let init = Invocation::InitializeObject { kind: "juego".into() };

        let out = generate(Action::InitializeObject, &init, EngineTarget::Custom);
        assert_eq!(
            out.into_code(),
            "// Acción initGame no implementada para motor custom"
        );

        let out = generate(Action::InitializeObject, &init, EngineTarget::Generic);
        let code = out.into_code();
        assert!(code.starts_with("// initGame({"));
        assert!(code.contains("\"type\":\"juego\""));
    }

    #[test]
    fn generic_engine_serializes_parameters() {
        let out = generate(Action::CreateObject, &create_caja(), EngineTarget::Generic);
        assert!(out.is_rendered());
        let code = out.into_code();
        assert!(code.starts_with("// createObject({"));
        assert!(code.contains("\"type\":\"caja\""));
        assert!(code.contains("\"x\":100"));
    }

    #[test]
    fn set_position_renders_through_the_move_template() {
        // SetPosition delegates to the MoveObject payload, so it renders
        // instead of stubbing even though no table lists "setPosition".
        let mv = Invocation::MoveObject { name: "caja".into(), x: 1, y: 2 };
        let out = generate(Action::SetPosition, &mv, EngineTarget::Kaplay);
        assert_eq!(out.into_code(), "caja.pos = vec2(1, 2);");
    }
}
