//! Pattern catalog
//!
//! The static table of command categories, each holding an ordered list of
//! (regex, action) rules. First match wins, category order then rule order;
//! two patterns can match the same input, so declaration order is load-bearing.
//! The catalog is built once and shared read-only; it also backs the
//! introspection API (`:comandos`, `:buscar`, help lookups).

use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder};
use serde::Serialize;

/// Every command the interpreter understands, one variant per action
/// identifier. Handler dispatch matches on this exhaustively, so a rule
/// pointing at an unhandled action cannot compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    // creation
    CreateObject,
    InitializeObject,
    CloneObject,
    // movement
    MoveObject,
    SetPosition,
    TeleportObject,
    CenterObject,
    RotateObject,
    ScaleObject,
    // appearance
    SetColor,
    SetSize,
    SetSprite,
    SetOpacity,
    HideObject,
    ShowObject,
    BlinkObject,
    // physics
    AddGravity,
    SetVelocity,
    JumpObject,
    PushObject,
    SetFriction,
    SetBounce,
    SetMass,
    StopObject,
    // controls
    BindKey,
    BindClick,
    MakeDraggable,
    FollowMouse,
    // collisions
    OnCollision,
    DetectNear,
    // audio
    PlaySound,
    PlayMusic,
    StopSound,
    SetVolume,
    Mute,
    // scenes
    GoToScene,
    RestartScene,
    PauseGame,
    ResumeGame,
    // camera
    CameraFollow,
    SetZoom,
    SetCameraPosition,
    CenterCamera,
    ShakeCamera,
    // effects
    AddEffect,
    CreateParticles,
    CreateExplosion,
    FlashObject,
    FadeOut,
    FadeIn,
    // logic
    SetVariable,
    IfCondition,
    Repeat,
    SetInterval,
    Wait,
    DestroyObject,
    // game
    InitGame,
    StartGame,
    EndGame,
    AddScore,
    AddLife,
    RemoveLife,
    SaveGame,
    LoadGame,
}

impl Action {
    /// The action identifier as it appears in history, exports and help.
    pub fn as_str(self) -> &'static str {
        match self {
            Action::CreateObject => "createObject",
            Action::InitializeObject => "initializeObject",
            Action::CloneObject => "cloneObject",
            Action::MoveObject => "moveObject",
            Action::SetPosition => "setPosition",
            Action::TeleportObject => "teleportObject",
            Action::CenterObject => "centerObject",
            Action::RotateObject => "rotateObject",
            Action::ScaleObject => "scaleObject",
            Action::SetColor => "setColor",
            Action::SetSize => "setSize",
            Action::SetSprite => "setSprite",
            Action::SetOpacity => "setOpacity",
            Action::HideObject => "hideObject",
            Action::ShowObject => "showObject",
            Action::BlinkObject => "blinkObject",
            Action::AddGravity => "addGravity",
            Action::SetVelocity => "setVelocity",
            Action::JumpObject => "jumpObject",
            Action::PushObject => "pushObject",
            Action::SetFriction => "setFriction",
            Action::SetBounce => "setBounce",
            Action::SetMass => "setMass",
            Action::StopObject => "stopObject",
            Action::BindKey => "bindKey",
            Action::BindClick => "bindClick",
            Action::MakeDraggable => "makeDraggable",
            Action::FollowMouse => "followMouse",
            Action::OnCollision => "onCollision",
            Action::DetectNear => "detectNear",
            Action::PlaySound => "playSound",
            Action::PlayMusic => "playMusic",
            Action::StopSound => "stopSound",
            Action::SetVolume => "setVolume",
            Action::Mute => "mute",
            Action::GoToScene => "goToScene",
            Action::RestartScene => "restartScene",
            Action::PauseGame => "pauseGame",
            Action::ResumeGame => "resumeGame",
            Action::CameraFollow => "cameraFollow",
            Action::SetZoom => "setZoom",
            Action::SetCameraPosition => "setCameraPosition",
            Action::CenterCamera => "centerCamera",
            Action::ShakeCamera => "shakeCamera",
            Action::AddEffect => "addEffect",
            Action::CreateParticles => "createParticles",
            Action::CreateExplosion => "createExplosion",
            Action::FlashObject => "flashObject",
            Action::FadeOut => "fadeOut",
            Action::FadeIn => "fadeIn",
            Action::SetVariable => "setVariable",
            Action::IfCondition => "ifCondition",
            Action::Repeat => "repeat",
            Action::SetInterval => "setInterval",
            Action::Wait => "wait",
            Action::DestroyObject => "destroyObject",
            Action::InitGame => "initGame",
            Action::StartGame => "startGame",
            Action::EndGame => "endGame",
            Action::AddScore => "addScore",
            Action::AddLife => "addLife",
            Action::RemoveLife => "removeLife",
            Action::SaveGame => "saveGame",
            Action::LoadGame => "loadGame",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recognizable phrasing: a pattern plus the action it dispatches to.
pub struct Rule {
    pub pattern: Regex,
    pub action: Action,
}

/// Named, ordered group of rules covering one functional area.
pub struct Category {
    pub name: &'static str,
    pub rules: Vec<Rule>,
}

/// The full, immutable rule set. Built once, never mutated.
pub struct Catalog {
    categories: Vec<Category>,
}

/// Result of scanning the catalog: which rule fired and what it captured.
/// `captures[0]` is always the full matched text.
#[derive(Debug, Clone)]
pub struct RuleMatch {
    pub action: Action,
    pub category: &'static str,
    pub captures: Vec<Option<String>>,
}

/// Introspection row: one rule described for listings and search.
#[derive(Debug, Clone, Serialize)]
pub struct CommandInfo {
    pub action: Action,
    pub category: &'static str,
    pub pattern: String,
    pub example: &'static str,
}

/// Help payload for a single action, from its first owning rule.
#[derive(Debug, Clone, Serialize)]
pub struct CommandHelp {
    pub action: Action,
    pub category: &'static str,
    pub pattern: String,
    pub description: String,
    pub example: &'static str,
}

// Patterns are written against *normalized* input: lowercase and without
// diacritics ("posicion", "camara", "musica"). An accented pattern could
// never fire.
#[rustfmt::skip]
const RULES: &[(&str, &[(&str, Action)])] = &[
    ("creation", &[
        (r"crear (\w+)(?: en (\d+),(\d+))?", Action::CreateObject),
        (r"nuevo (\w+)(?: en (\d+),(\d+))?", Action::CreateObject),
        (r"anadir (\w+)(?: en (\d+),(\d+))?", Action::CreateObject),
        (r"generar (\w+)(?: en (\d+),(\d+))?", Action::CreateObject),
        (r"inicializar (\w+)", Action::InitializeObject),
        (r"clonar (\w+) como (\w+)", Action::CloneObject),
    ]),
    ("movement", &[
        (r"mover (\w+) a (\d+),(\d+)", Action::MoveObject),
        (r"posicion (\w+) (\d+),(\d+)", Action::SetPosition),
        (r"ir (\w+) a (\d+),(\d+)", Action::MoveObject),
        (r"teleportar (\w+) a (\d+),(\d+)", Action::TeleportObject),
        (r"centrar (\w+)", Action::CenterObject),
        (r"rotar (\w+) (\d+) grados", Action::RotateObject),
        (r"escalar (\w+) (\d+(?:\.\d+)?)", Action::ScaleObject),
    ]),
    ("appearance", &[
        (r"color (\w+) (\w+)", Action::SetColor),
        (r"tamano (\w+) (\d+),(\d+)", Action::SetSize),
        (r"sprite (\w+) (\w+)", Action::SetSprite),
        (r"imagen (\w+) (\w+)", Action::SetSprite),
        (r"transparencia (\w+) (\d+(?:\.\d+)?)", Action::SetOpacity),
        (r"ocultar (\w+)", Action::HideObject),
        (r"mostrar (\w+)", Action::ShowObject),
        (r"parpadear (\w+)", Action::BlinkObject),
    ]),
    ("physics", &[
        (r"gravedad (\w+)", Action::AddGravity),
        (r"velocidad (\w+) (\d+)", Action::SetVelocity),
        (r"saltar (\w+)", Action::JumpObject),
        (r"empujar (\w+) hacia (\w+)", Action::PushObject),
        (r"friccion (\w+) (\d+(?:\.\d+)?)", Action::SetFriction),
        (r"rebote (\w+) (\d+(?:\.\d+)?)", Action::SetBounce),
        (r"masa (\w+) (\d+)", Action::SetMass),
        (r"detener (\w+)", Action::StopObject),
    ]),
    ("controls", &[
        (r"tecla (\w+) hacer (\w+) (\w+)", Action::BindKey),
        (r"cuando presione (\w+) hacer (\w+) (\w+)", Action::BindKey),
        (r"click en (\w+) hacer (\w+)", Action::BindClick),
        (r"arrastrar (\w+)", Action::MakeDraggable),
        (r"seguir raton (\w+)", Action::FollowMouse),
    ]),
    ("collisions", &[
        (r"cuando (\w+) toca (\w+) hacer (\w+)", Action::OnCollision),
        (r"colision (\w+) con (\w+) hacer (\w+)", Action::OnCollision),
        (r"si (\w+) choca con (\w+) entonces (\w+)", Action::OnCollision),
        (r"detectar (\w+) cerca de (\w+)", Action::DetectNear),
    ]),
    ("audio", &[
        (r"sonido (\w+)", Action::PlaySound),
        (r"musica (\w+)(?: loop)?", Action::PlayMusic),
        (r"parar sonido", Action::StopSound),
        (r"volumen (\d+)", Action::SetVolume),
        (r"silenciar", Action::Mute),
    ]),
    ("scenes", &[
        (r"ir a (\w+)", Action::GoToScene),
        (r"escena (\w+)", Action::GoToScene),
        (r"cambiar a (\w+)", Action::GoToScene),
        (r"reiniciar escena", Action::RestartScene),
        (r"pausar juego", Action::PauseGame),
        (r"reanudar juego", Action::ResumeGame),
    ]),
    ("camera", &[
        (r"camara seguir (\w+)", Action::CameraFollow),
        (r"zoom (\d+(?:\.\d+)?)", Action::SetZoom),
        (r"camara en (\d+),(\d+)", Action::SetCameraPosition),
        (r"centrar camara", Action::CenterCamera),
        (r"sacudir camara", Action::ShakeCamera),
    ]),
    ("effects", &[
        (r"efecto (\w+) en (\w+)", Action::AddEffect),
        (r"particulas (\w+) en (\d+),(\d+)", Action::CreateParticles),
        (r"explosion en (\d+),(\d+)", Action::CreateExplosion),
        (r"destello (\w+)", Action::FlashObject),
        (r"desaparecer (\w+)", Action::FadeOut),
        (r"aparecer (\w+)", Action::FadeIn),
    ]),
    ("logic", &[
        (r"variable (\w+) = (\d+)", Action::SetVariable),
        (r"si (\w+) > (\d+) entonces (\w+)", Action::IfCondition),
        (r"repetir (\d+) veces (\w+)", Action::Repeat),
        (r"cada (\d+) segundos hacer (\w+)", Action::SetInterval),
        (r"esperar (\d+) segundos", Action::Wait),
        (r"eliminar (\w+)", Action::DestroyObject),
    ]),
    ("game", &[
        (r"inicializar juego", Action::InitGame),
        (r"empezar juego", Action::StartGame),
        (r"terminar juego", Action::EndGame),
        (r"puntuacion \+(\d+)", Action::AddScore),
        (r"vida \+(\d+)", Action::AddLife),
        (r"vida -(\d+)", Action::RemoveLife),
        (r"guardar juego", Action::SaveGame),
        (r"cargar juego", Action::LoadGame),
    ]),
];

impl Catalog {
    /// Compile the full rule set. Fails only on an invalid pattern, which
    /// is a defect in the table itself.
    pub fn new() -> Result<Self> {
        let mut categories = Vec::with_capacity(RULES.len());
        for &(name, rules) in RULES {
            let mut compiled = Vec::with_capacity(rules.len());
            for &(pattern, action) in rules {
                let regex = RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .with_context(|| format!("patrón inválido en la categoría {name}: {pattern}"))?;
                compiled.push(Rule { pattern: regex, action });
            }
            categories.push(Category { name, rules: compiled });
        }
        Ok(Self { categories })
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// First rule whose pattern matches the normalized input, scanning
    /// categories then rules in declaration order. Unanchored, like the
    /// patterns themselves expect.
    pub fn find_match(&self, normalized: &str) -> Option<RuleMatch> {
        for category in &self.categories {
            for rule in &category.rules {
                if let Some(caps) = rule.pattern.captures(normalized) {
                    let captures = caps
                        .iter()
                        .map(|m| m.map(|m| m.as_str().to_string()))
                        .collect();
                    return Some(RuleMatch {
                        action: rule.action,
                        category: category.name,
                        captures,
                    });
                }
            }
        }
        None
    }

    /// Every rule in the catalog, in match order.
    pub fn available_commands(&self) -> Vec<CommandInfo> {
        let mut commands = Vec::new();
        for category in &self.categories {
            for rule in &category.rules {
                commands.push(CommandInfo {
                    action: rule.action,
                    category: category.name,
                    pattern: rule.pattern.as_str().to_string(),
                    example: example_for_pattern(rule.pattern.as_str()),
                });
            }
        }
        commands
    }

    /// Help for one action identifier, from its first owning rule.
    pub fn command_help(&self, action_name: &str) -> Option<CommandHelp> {
        for category in &self.categories {
            for rule in &category.rules {
                if rule.action.as_str() == action_name {
                    return Some(CommandHelp {
                        action: rule.action,
                        category: category.name,
                        pattern: rule.pattern.as_str().to_string(),
                        description: format!("Acción: {}", rule.action),
                        example: example_for_pattern(rule.pattern.as_str()),
                    });
                }
            }
        }
        None
    }

    /// All rules of one category, empty if the category does not exist.
    pub fn commands_by_category(&self, category_name: &str) -> Vec<CommandInfo> {
        self.categories
            .iter()
            .filter(|c| c.name == category_name)
            .flat_map(|c| {
                c.rules.iter().map(|rule| CommandInfo {
                    action: rule.action,
                    category: c.name,
                    pattern: rule.pattern.as_str().to_string(),
                    example: example_for_pattern(rule.pattern.as_str()),
                })
            })
            .collect()
    }

    /// Substring search over action identifiers and category names.
    pub fn search_commands(&self, term: &str) -> Vec<CommandInfo> {
        let term = term.to_lowercase();
        let mut results = Vec::new();
        for category in &self.categories {
            for rule in &category.rules {
                if rule.action.as_str().to_lowercase().contains(&term)
                    || category.name.to_lowercase().contains(&term)
                {
                    results.push(CommandInfo {
                        action: rule.action,
                        category: category.name,
                        pattern: rule.pattern.as_str().to_string(),
                        example: example_for_pattern(rule.pattern.as_str()),
                    });
                }
            }
        }
        results
    }
}

/// Example command for a pattern, keyed by its leading keyword.
pub fn example_for_pattern(source: &str) -> &'static str {
    const EXAMPLES: &[(&str, &str)] = &[
        ("crear", "crear jugador en 100,200"),
        ("mover", "mover jugador a 300,400"),
        ("color", "color jugador rojo"),
        ("gravedad", "gravedad jugador"),
        ("tecla", "tecla espacio hacer saltar jugador"),
        ("sonido", "sonido explosion"),
    ];

    for (keyword, example) in EXAMPLES {
        if source.contains(keyword) {
            return example;
        }
    }
    "ejemplo no disponible"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;

    #[test]
    fn catalog_builds() {
        let catalog = Catalog::new().unwrap();
        assert_eq!(catalog.categories().len(), 12);
        let rules: usize = catalog.categories().iter().map(|c| c.rules.len()).sum();
        assert_eq!(rules, 74);
    }

    #[test]
    fn first_match_wins_by_declaration_order() {
        let catalog = Catalog::new().unwrap();
        // "inicializar juego" matches creation's "inicializar (\w+)" before
        // the game category's literal rule.
        let m = catalog.find_match("inicializar juego").unwrap();
        assert_eq!(m.action, Action::InitializeObject);
        assert_eq!(m.category, "creation");
        // "ir jugador a 10,20" is movement; "ir a menu" falls through to scenes.
        let m = catalog.find_match("ir jugador a 10,20").unwrap();
        assert_eq!(m.action, Action::MoveObject);
        let m = catalog.find_match("ir a menu").unwrap();
        assert_eq!(m.action, Action::GoToScene);
        assert_eq!(m.category, "scenes");
    }

    #[test]
    fn captures_include_full_match_at_zero() {
        let catalog = Catalog::new().unwrap();
        let m = catalog.find_match("crear jugador en 100,200").unwrap();
        assert_eq!(m.captures[0].as_deref(), Some("crear jugador en 100,200"));
        assert_eq!(m.captures[1].as_deref(), Some("jugador"));
        assert_eq!(m.captures[2].as_deref(), Some("100"));
        assert_eq!(m.captures[3].as_deref(), Some("200"));
    }

    #[test]
    fn optional_groups_come_back_empty() {
        let catalog = Catalog::new().unwrap();
        let m = catalog.find_match("crear caja").unwrap();
        assert_eq!(m.action, Action::CreateObject);
        assert_eq!(m.captures[1].as_deref(), Some("caja"));
        assert!(m.captures[2].is_none());
        assert!(m.captures[3].is_none());
    }

    #[test]
    fn no_match_for_gibberish() {
        let catalog = Catalog::new().unwrap();
        assert!(catalog.find_match("bailar la macarena").is_none());
    }

    // Catalog self-consistency: a documented example, once normalized, must
    // hit its own rule or an earlier-declared one.
    #[test]
    fn examples_match_their_own_rule_or_earlier() {
        let catalog = Catalog::new().unwrap();
        let ordered: Vec<(usize, &Rule)> = catalog
            .categories()
            .iter()
            .flat_map(|c| c.rules.iter())
            .enumerate()
            .collect();

        for (index, rule) in &ordered {
            let example = example_for_pattern(rule.pattern.as_str());
            if example == "ejemplo no disponible" {
                continue;
            }
            let normalized = normalize(example);
            let fired = ordered
                .iter()
                .find(|(_, r)| r.pattern.is_match(&normalized))
                .map(|(i, _)| *i)
                .unwrap_or_else(|| panic!("example '{example}' matches nothing"));
            assert!(
                fired <= *index,
                "example '{example}' for rule {index} fires rule {fired} declared later"
            );
        }
    }

    #[test]
    fn introspection_lists_and_searches() {
        let catalog = Catalog::new().unwrap();
        let all = catalog.available_commands();
        assert_eq!(all.len(), 74);
        assert_eq!(all[0].action, Action::CreateObject);
        assert_eq!(all[0].example, "crear jugador en 100,200");

        let help = catalog.command_help("setColor").unwrap();
        assert_eq!(help.category, "appearance");
        assert_eq!(help.example, "color jugador rojo");
        assert!(catalog.command_help("noSuchAction").is_none());

        let physics = catalog.commands_by_category("physics");
        assert_eq!(physics.len(), 8);
        assert_eq!(physics[0].action, Action::AddGravity);
        assert!(catalog.commands_by_category("cooking").is_empty());

        let found = catalog.search_commands("camera");
        assert!(found.iter().any(|c| c.action == Action::CameraFollow));
        assert!(found.iter().any(|c| c.action == Action::SetZoom));
        let by_action = catalog.search_commands("sound");
        assert!(by_action.iter().any(|c| c.action == Action::PlaySound));
        assert!(by_action.iter().any(|c| c.action == Action::StopSound));
    }
}
