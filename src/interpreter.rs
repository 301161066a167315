//! Command interpreter
//!
//! The `processCommand` pipeline: normalize the input, scan the pattern
//! catalog, extract typed parameters for the matched action, render code
//! for the current engine, optionally run it through the execution hook,
//! and append the outcome to the session history. Failures come back as
//! data; this path never panics and never propagates an internal fault.

use std::collections::HashMap;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::catalog::{Action, Catalog, CommandHelp, CommandInfo};
use crate::codegen::{self, EngineTarget, Invocation};
use crate::engine::EngineDescriptor;
use crate::lookups::{translate_color, translate_direction, translate_key};
use crate::normalize::normalize;

/// Why a command did not produce code. All three are ordinary outcomes,
/// surfaced to the user as data.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Comando no reconocido")]
    NotRecognized { suggestion: String },
    #[error("No hay motor gráfico seleccionado")]
    NoEngine,
    #[error("Error en la acción {action}: {message}")]
    Handler {
        action: Action,
        category: &'static str,
        message: String,
    },
}

/// A processed command: what matched, what was generated, what happened.
#[derive(Debug, Clone, Serialize)]
pub struct CommandSuccess {
    pub action: Action,
    pub category: &'static str,
    pub code: String,
    /// False when the engine had no template and the code is a stub comment.
    pub rendered: bool,
    pub description: String,
    /// True only if the engine's execution hook accepted the code.
    pub executed: bool,
}

/// One line of session history, in chronological order.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub input: String,
    pub action: Action,
    pub category: &'static str,
    pub code: String,
    pub description: String,
    pub executed: bool,
    pub timestamp: DateTime<Utc>,
}

/// Snapshot of the session for export or display.
#[derive(Debug, Clone, Serialize)]
pub struct ExportSnapshot {
    pub history: Vec<HistoryEntry>,
    pub variables: HashMap<String, i64>,
    pub timestamp: DateTime<Utc>,
}

/// The keyword system: immutable catalog plus mutable session state.
pub struct KeywordSystem {
    catalog: Catalog,
    engine: Option<EngineDescriptor>,
    history: Vec<HistoryEntry>,
    variables: HashMap<String, i64>,
}

impl KeywordSystem {
    pub fn new() -> Result<Self> {
        Ok(Self {
            catalog: Catalog::new()?,
            engine: None,
            history: Vec::new(),
            variables: HashMap::new(),
        })
    }

    /// Replace the current engine context. Called by the outer layer when
    /// the active engine changes; `None` means no engine is selected.
    pub fn set_current_engine(&mut self, engine: Option<EngineDescriptor>) {
        self.engine = engine;
    }

    pub fn current_engine_name(&self) -> Option<&str> {
        self.engine.as_ref().map(|e| e.name.as_str())
    }

    /// Process one natural-language command. Total over all inputs.
    pub fn process_command(&mut self, input: &str) -> Result<CommandSuccess, CommandError> {
        let normalized = normalize(input);

        let Some(matched) = self.catalog.find_match(&normalized) else {
            return Err(CommandError::NotRecognized {
                suggestion: suggestion_for(&normalized),
            });
        };

        let Some(engine) = &self.engine else {
            return Err(CommandError::NoEngine);
        };
        let target = EngineTarget::from_name(&engine.name);

        let (invocation, description) = self
            .build_invocation(matched.action, &matched.captures)
            .map_err(|e| CommandError::Handler {
                action: matched.action,
                category: matched.category,
                message: e.to_string(),
            })?;

        if let Invocation::SetVariable { name, value } = &invocation {
            self.variables.insert(name.clone(), *value);
        }

        let generated = codegen::generate(matched.action, &invocation, target);
        let rendered = generated.is_rendered();
        let code = generated.into_code();
        let executed = self.execute_on_engine(&code);

        let full_match = matched.captures[0].as_deref().unwrap_or("").to_string();
        self.history.push(HistoryEntry {
            input: full_match,
            action: matched.action,
            category: matched.category,
            code: code.clone(),
            description: description.clone(),
            executed,
            timestamp: Utc::now(),
        });

        Ok(CommandSuccess {
            action: matched.action,
            category: matched.category,
            code,
            rendered,
            description,
            executed,
        })
    }

    /// Extract typed parameters for the matched action and phrase the
    /// human-readable description. Exhaustive over [`Action`], so a rule
    /// without a handler cannot exist.
    fn build_invocation(
        &self,
        action: Action,
        caps: &[Option<String>],
    ) -> Result<(Invocation, String)> {
        let out = match action {
            Action::CreateObject => {
                let kind = req(caps, 1)?.to_string();
                let x = int_or(caps, 2, 100)?;
                let y = int_or(caps, 3, 100)?;
                let name = self.generate_object_name(&kind);
                let description =
                    format!("Crear {kind} llamado \"{name}\" en posición ({x}, {y})");
                (Invocation::CreateObject { name, kind, x, y }, description)
            }
            Action::InitializeObject => {
                let kind = req(caps, 1)?.to_string();
                let description = format!("Inicializar {kind}");
                (Invocation::InitializeObject { kind }, description)
            }
            Action::CloneObject => {
                let source = req(caps, 1)?.to_string();
                let name = req(caps, 2)?.to_string();
                let description = format!("Clonar {source} como {name}");
                (Invocation::CloneObject { source, name }, description)
            }
            Action::MoveObject | Action::SetPosition => {
                let name = req(caps, 1)?.to_string();
                let x = int(caps, 2)?;
                let y = int(caps, 3)?;
                let description = format!("Mover {name} a posición ({x}, {y})");
                (Invocation::MoveObject { name, x, y }, description)
            }
            Action::TeleportObject => {
                let name = req(caps, 1)?.to_string();
                let x = int(caps, 2)?;
                let y = int(caps, 3)?;
                let description = format!("Teleportar {name} a ({x}, {y})");
                (Invocation::TeleportObject { name, x, y }, description)
            }
            Action::CenterObject => {
                let name = req(caps, 1)?.to_string();
                let description = format!("Centrar {name} en pantalla");
                (Invocation::CenterObject { name }, description)
            }
            Action::RotateObject => {
                let name = req(caps, 1)?.to_string();
                let angle = int(caps, 2)?;
                let description = format!("Rotar {name} {angle} grados");
                (Invocation::RotateObject { name, angle }, description)
            }
            Action::ScaleObject => {
                let name = req(caps, 1)?.to_string();
                let scale = float(caps, 2)?;
                let description = format!("Escalar {name} a {scale}x");
                (Invocation::ScaleObject { name, scale }, description)
            }
            Action::SetColor => {
                let name = req(caps, 1)?.to_string();
                let color_word = req(caps, 2)?;
                let color = translate_color(color_word).to_string();
                let description = format!("Cambiar color de {name} a {color_word}");
                (Invocation::SetColor { name, color }, description)
            }
            Action::SetSize => {
                let name = req(caps, 1)?.to_string();
                let width = int(caps, 2)?;
                let height = int(caps, 3)?;
                let description = format!("Cambiar tamaño de {name} a {width}x{height}");
                (Invocation::SetSize { name, width, height }, description)
            }
            Action::SetSprite => {
                let name = req(caps, 1)?.to_string();
                let sprite = req(caps, 2)?.to_string();
                let description = format!("Cambiar sprite de {name} a {sprite}");
                (Invocation::SetSprite { name, sprite }, description)
            }
            Action::SetOpacity => {
                let name = req(caps, 1)?.to_string();
                let opacity = float(caps, 2)?;
                let description = format!("Cambiar transparencia de {name} a {opacity}");
                (Invocation::SetOpacity { name, opacity }, description)
            }
            Action::HideObject => {
                let name = req(caps, 1)?.to_string();
                let description = format!("Ocultar {name}");
                (Invocation::HideObject { name }, description)
            }
            Action::ShowObject => {
                let name = req(caps, 1)?.to_string();
                let description = format!("Mostrar {name}");
                (Invocation::ShowObject { name }, description)
            }
            Action::BlinkObject => {
                let name = req(caps, 1)?.to_string();
                let description = format!("Hacer parpadear a {name}");
                (Invocation::BlinkObject { name }, description)
            }
            Action::AddGravity => {
                let name = req(caps, 1)?.to_string();
                let description = format!("Aplicar gravedad a {name}");
                (Invocation::AddGravity { name }, description)
            }
            Action::SetVelocity => {
                let name = req(caps, 1)?.to_string();
                let velocity = int(caps, 2)?;
                let description = format!("Establecer velocidad de {name} a {velocity}");
                (Invocation::SetVelocity { name, velocity }, description)
            }
            Action::JumpObject => {
                let name = req(caps, 1)?.to_string();
                let description = format!("Hacer saltar a {name}");
                (Invocation::JumpObject { name }, description)
            }
            Action::PushObject => {
                let name = req(caps, 1)?.to_string();
                let direction_word = req(caps, 2)?;
                let direction = translate_direction(direction_word).to_string();
                let description = format!("Empujar {name} hacia {direction_word}");
                (Invocation::PushObject { name, direction }, description)
            }
            Action::SetFriction => {
                let name = req(caps, 1)?.to_string();
                let friction = float(caps, 2)?;
                let description = format!("Establecer fricción de {name} a {friction}");
                (Invocation::SetFriction { name, friction }, description)
            }
            Action::SetBounce => {
                let name = req(caps, 1)?.to_string();
                let bounce = float(caps, 2)?;
                let description = format!("Establecer rebote de {name} a {bounce}");
                (Invocation::SetBounce { name, bounce }, description)
            }
            Action::SetMass => {
                let name = req(caps, 1)?.to_string();
                let mass = int(caps, 2)?;
                let description = format!("Establecer masa de {name} a {mass}");
                (Invocation::SetMass { name, mass }, description)
            }
            Action::StopObject => {
                let name = req(caps, 1)?.to_string();
                let description = format!("Detener {name}");
                (Invocation::StopObject { name }, description)
            }
            Action::BindKey => {
                let key_word = req(caps, 1)?;
                let key = translate_key(key_word).to_string();
                let action_name = req(caps, 2)?.to_string();
                let object = req(caps, 3)?.to_string();
                let description =
                    format!("Asignar tecla {key_word} para {action_name} {object}");
                (Invocation::BindKey { key, action: action_name, object }, description)
            }
            Action::BindClick => {
                let object = req(caps, 1)?.to_string();
                let action_name = req(caps, 2)?.to_string();
                let description = format!("Asignar click en {object} para {action_name}");
                (Invocation::BindClick { object, action: action_name }, description)
            }
            Action::MakeDraggable => {
                let name = req(caps, 1)?.to_string();
                let description = format!("Hacer arrastrable a {name}");
                (Invocation::MakeDraggable { name }, description)
            }
            Action::FollowMouse => {
                let name = req(caps, 1)?.to_string();
                let description = format!("Hacer que {name} siga al ratón");
                (Invocation::FollowMouse { name }, description)
            }
            Action::OnCollision => {
                let object1 = req(caps, 1)?.to_string();
                let object2 = req(caps, 2)?.to_string();
                let action_name = req(caps, 3)?.to_string();
                let description =
                    format!("Cuando {object1} toque {object2}, ejecutar {action_name}");
                (
                    Invocation::OnCollision { object1, object2, action: action_name },
                    description,
                )
            }
            Action::DetectNear => {
                let object1 = req(caps, 1)?.to_string();
                let object2 = req(caps, 2)?.to_string();
                let description = format!("Detectar {object1} cerca de {object2}");
                (Invocation::DetectNear { object1, object2 }, description)
            }
            Action::PlaySound => {
                let sound = req(caps, 1)?.to_string();
                let description = format!("Reproducir sonido {sound}");
                (Invocation::PlaySound { sound }, description)
            }
            Action::PlayMusic => {
                let music = req(caps, 1)?.to_string();
                let looped = caps[0].as_deref().is_some_and(|full| full.contains("loop"));
                let description = format!(
                    "Reproducir música {music}{}",
                    if looped { " en bucle" } else { "" }
                );
                (Invocation::PlayMusic { music, looped }, description)
            }
            Action::StopSound => {
                (Invocation::StopSound {}, "Parar todos los sonidos".to_string())
            }
            Action::SetVolume => {
                let volume = int(caps, 1)?;
                let description = format!("Establecer volumen a {volume}");
                (Invocation::SetVolume { volume }, description)
            }
            Action::Mute => (Invocation::Mute {}, "Silenciar el audio".to_string()),
            Action::GoToScene => {
                let scene = req(caps, 1)?.to_string();
                let description = format!("Ir a escena {scene}");
                (Invocation::GoToScene { scene }, description)
            }
            Action::RestartScene => {
                (Invocation::RestartScene {}, "Reiniciar la escena actual".to_string())
            }
            Action::PauseGame => (Invocation::PauseGame {}, "Pausar el juego".to_string()),
            Action::ResumeGame => (Invocation::ResumeGame {}, "Reanudar el juego".to_string()),
            Action::CameraFollow => {
                let object = req(caps, 1)?.to_string();
                let description = format!("Cámara seguir a {object}");
                (Invocation::CameraFollow { object }, description)
            }
            Action::SetZoom => {
                let zoom = float(caps, 1)?;
                let description = format!("Establecer zoom a {zoom}x");
                (Invocation::SetZoom { zoom }, description)
            }
            Action::SetCameraPosition => {
                let x = int(caps, 1)?;
                let y = int(caps, 2)?;
                let description = format!("Mover cámara a ({x}, {y})");
                (Invocation::SetCameraPosition { x, y }, description)
            }
            Action::CenterCamera => {
                (Invocation::CenterCamera {}, "Centrar la cámara".to_string())
            }
            Action::ShakeCamera => {
                (Invocation::ShakeCamera {}, "Sacudir la cámara".to_string())
            }
            Action::AddEffect => {
                let effect = req(caps, 1)?.to_string();
                let name = req(caps, 2)?.to_string();
                let description = format!("Aplicar efecto {effect} a {name}");
                (Invocation::AddEffect { effect, name }, description)
            }
            Action::CreateParticles => {
                let kind = req(caps, 1)?.to_string();
                let x = int(caps, 2)?;
                let y = int(caps, 3)?;
                let description = format!("Crear partículas {kind} en ({x}, {y})");
                (Invocation::CreateParticles { kind, x, y }, description)
            }
            Action::CreateExplosion => {
                let x = int(caps, 1)?;
                let y = int(caps, 2)?;
                let description = format!("Crear explosión en ({x}, {y})");
                (Invocation::CreateExplosion { x, y }, description)
            }
            Action::FlashObject => {
                let name = req(caps, 1)?.to_string();
                let description = format!("Destello en {name}");
                (Invocation::FlashObject { name }, description)
            }
            Action::FadeOut => {
                let name = req(caps, 1)?.to_string();
                let description = format!("Desvanecer {name}");
                (Invocation::FadeOut { name }, description)
            }
            Action::FadeIn => {
                let name = req(caps, 1)?.to_string();
                let description = format!("Hacer aparecer {name}");
                (Invocation::FadeIn { name }, description)
            }
            Action::SetVariable => {
                let name = req(caps, 1)?.to_string();
                let value = int(caps, 2)?;
                let description = format!("Establecer variable {name} = {value}");
                (Invocation::SetVariable { name, value }, description)
            }
            Action::IfCondition => {
                let variable = req(caps, 1)?.to_string();
                let threshold = int(caps, 2)?;
                let action_name = req(caps, 3)?.to_string();
                let description =
                    format!("Si {variable} > {threshold}, ejecutar {action_name}");
                (
                    Invocation::IfCondition { variable, threshold, action: action_name },
                    description,
                )
            }
            Action::Repeat => {
                let count = int(caps, 1)?;
                let action_name = req(caps, 2)?.to_string();
                let description = format!("Repetir {action_name} {count} veces");
                (Invocation::Repeat { count, action: action_name }, description)
            }
            Action::SetInterval => {
                let seconds = int(caps, 1)?;
                let action_name = req(caps, 2)?.to_string();
                let description = format!("Cada {seconds} segundos, ejecutar {action_name}");
                (Invocation::SetInterval { seconds, action: action_name }, description)
            }
            Action::Wait => {
                let seconds = int(caps, 1)?;
                let description = format!("Esperar {seconds} segundos");
                (Invocation::Wait { seconds }, description)
            }
            Action::DestroyObject => {
                let name = req(caps, 1)?.to_string();
                let description = format!("Eliminar {name}");
                (Invocation::DestroyObject { name }, description)
            }
            Action::InitGame => (Invocation::InitGame {}, "Inicializar juego".to_string()),
            Action::StartGame => (Invocation::StartGame {}, "Empezar el juego".to_string()),
            Action::EndGame => (Invocation::EndGame {}, "Terminar el juego".to_string()),
            Action::AddScore => {
                let amount = int(caps, 1)?;
                let description = format!("Sumar {amount} a la puntuación");
                (Invocation::AddScore { amount }, description)
            }
            Action::AddLife => {
                let amount = int(caps, 1)?;
                let description = format!("Sumar {amount} vidas");
                (Invocation::AddLife { amount }, description)
            }
            Action::RemoveLife => {
                let amount = int(caps, 1)?;
                let description = format!("Restar {amount} vidas");
                (Invocation::RemoveLife { amount }, description)
            }
            Action::SaveGame => (Invocation::SaveGame {}, "Guardar la partida".to_string()),
            Action::LoadGame => (Invocation::LoadGame {}, "Cargar la partida".to_string()),
        };
        Ok(out)
    }

    /// Run generated code through the engine's hook, if any. A hook
    /// failure degrades to `false`, it never fails the command.
    fn execute_on_engine(&mut self, code: &str) -> bool {
        match self.engine.as_mut().and_then(|e| e.exec.as_mut()) {
            Some(hook) => match hook(code) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!("el motor rechazó el código generado: {e:#}");
                    false
                }
            },
            None => false,
        }
    }

    /// Name for a created object: the bare type the first time, then
    /// `tipo2`, `tipo3`, … based on prior creations in this session.
    fn generate_object_name(&self, kind: &str) -> String {
        let existing = self
            .history
            .iter()
            .filter(|e| e.action == Action::CreateObject && e.code.contains(kind))
            .count();
        if existing > 0 {
            format!("{kind}{}", existing + 1)
        } else {
            kind.to_string()
        }
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn variables(&self) -> &HashMap<String, i64> {
        &self.variables
    }

    /// Empty history and variables together. Object-name numbering starts
    /// over from the unsuffixed form afterwards.
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.variables.clear();
    }

    /// Serializable snapshot of the session.
    pub fn export_commands(&self) -> ExportSnapshot {
        ExportSnapshot {
            history: self.history.clone(),
            variables: self.variables.clone(),
            timestamp: Utc::now(),
        }
    }

    // Catalog introspection, independent of live matching.

    pub fn available_commands(&self) -> Vec<CommandInfo> {
        self.catalog.available_commands()
    }

    pub fn command_help(&self, action_name: &str) -> Option<CommandHelp> {
        self.catalog.command_help(action_name)
    }

    pub fn commands_by_category(&self, category_name: &str) -> Vec<CommandInfo> {
        self.catalog.commands_by_category(category_name)
    }

    pub fn search_commands(&self, term: &str) -> Vec<CommandInfo> {
        self.catalog.search_commands(term)
    }
}

fn req<'a>(caps: &'a [Option<String>], index: usize) -> Result<&'a str> {
    caps.get(index)
        .and_then(|c| c.as_deref())
        .ok_or_else(|| anyhow!("falta el grupo de captura {index}"))
}

fn int(caps: &[Option<String>], index: usize) -> Result<i64> {
    let raw = req(caps, index)?;
    raw.parse()
        .with_context(|| format!("número entero inválido: {raw}"))
}

fn int_or(caps: &[Option<String>], index: usize, default: i64) -> Result<i64> {
    match caps.get(index).and_then(|c| c.as_deref()) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("número entero inválido: {raw}")),
        None => Ok(default),
    }
}

fn float(caps: &[Option<String>], index: usize) -> Result<f64> {
    let raw = req(caps, index)?;
    raw.parse()
        .with_context(|| format!("número inválido: {raw}"))
}

const SUGGESTION_EXAMPLES: &[&str] = &[
    "crear jugador en 100,200",
    "mover jugador a 300,400",
    "color jugador rojo",
    "gravedad jugador",
    "tecla espacio hacer saltar jugador",
    "sonido explosion",
    "ir a menu_principal",
];

/// Best-effort hint for unrecognized input: first example sharing any word
/// with the input, else a generic nudge. Always non-empty.
fn suggestion_for(normalized: &str) -> String {
    for example in SUGGESTION_EXAMPLES {
        if normalized
            .split(' ')
            .any(|word| !word.is_empty() && example.contains(word))
        {
            return format!("¿Quisiste decir: \"{example}\"?");
        }
    }
    "Intenta comandos como: \"crear jugador\", \"mover objeto\", \"color rojo\"".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn system_with(engine: &str) -> KeywordSystem {
        let mut system = KeywordSystem::new().unwrap();
        system.set_current_engine(Some(EngineDescriptor::named(engine)));
        system
    }

    #[test]
    fn create_on_custom_engine() {
        let mut system = system_with("custom");
        let out = system.process_command("crear jugador en 100,200").unwrap();
        assert_eq!(out.action, Action::CreateObject);
        assert_eq!(out.category, "creation");
        assert!(out.description.contains("(100, 200)"));
        assert!(out.code.contains("engine.createObject("));
        assert!(out.rendered);
        assert!(!out.executed);
    }

    #[test]
    fn create_defaults_to_100_100() {
        let mut system = system_with("custom");
        let out = system.process_command("crear caja").unwrap();
        assert!(out.description.contains("(100, 100)"));
        assert!(out.code.contains("x: 100"));
    }

    #[test]
    fn move_carries_literal_coordinates() {
        let mut system = system_with("kaplay");
        let out = system.process_command("mover jugador a 300,400").unwrap();
        assert_eq!(out.action, Action::MoveObject);
        assert!(out.code.contains("300"));
        assert!(out.code.contains("400"));
    }

    #[test]
    fn color_translates_for_kaplay_and_passes_unknowns_through() {
        let mut system = system_with("kaplay");
        let out = system.process_command("color jugador rojo").unwrap();
        assert!(out.code.contains("RED"));
        assert!(out.description.contains("rojo"));

        let mut system = system_with("custom");
        let out = system.process_command("color jugador turquesa").unwrap();
        assert!(out.code.contains("\"turquesa\""));
    }

    #[test]
    fn no_engine_beats_a_perfect_match() {
        let mut system = KeywordSystem::new().unwrap();
        let err = system.process_command("crear jugador en 100,200").unwrap_err();
        assert!(matches!(err, CommandError::NoEngine));
        assert_eq!(err.to_string(), "No hay motor gráfico seleccionado");
        assert!(system.history().is_empty());
    }

    #[test]
    fn unrecognized_input_gets_a_suggestion() {
        let mut system = system_with("custom");
        let err = system.process_command("bailar la macarena").unwrap_err();
        assert_eq!(err.to_string(), "Comando no reconocido");
        match err {
            CommandError::NotRecognized { suggestion } => assert!(!suggestion.is_empty()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn object_names_get_numeric_suffixes() {
        let mut system = system_with("custom");
        for expected in ["caja", "caja2", "caja3"] {
            let out = system.process_command("crear caja").unwrap();
            assert!(
                out.code.contains(&format!("const {expected} =")),
                "expected {expected} in {}",
                out.code
            );
        }
        // Clearing the session restarts numbering.
        system.clear_history();
        let out = system.process_command("crear caja").unwrap();
        assert!(out.code.contains("const caja ="));
    }

    #[test]
    fn set_variable_mutates_the_store() {
        let mut system = system_with("custom");
        system.process_command("variable puntos = 10").unwrap();
        assert_eq!(system.variables().get("puntos"), Some(&10));
        system.process_command("variable puntos = 25").unwrap();
        assert_eq!(system.variables().get("puntos"), Some(&25));

        system.clear_history();
        assert!(system.variables().is_empty());
        assert!(system.history().is_empty());
    }

    #[test]
    fn execution_hook_success_and_failure() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in_hook = seen.clone();
        let mut system = KeywordSystem::new().unwrap();
        system.set_current_engine(Some(EngineDescriptor::with_exec(
            "custom",
            Box::new(move |code: &str| {
                seen_in_hook.lock().unwrap().push(code.to_string());
                Ok(())
            }),
        )));

        let out = system.process_command("sonido explosion").unwrap();
        assert!(out.executed);
        assert_eq!(seen.lock().unwrap().as_slice(), ["engine.audio.play(\"explosion\");"]);

        // A rejecting hook degrades to executed=false, the command still succeeds.
        system.set_current_engine(Some(EngineDescriptor::with_exec(
            "custom",
            Box::new(|_: &str| Err(anyhow!("motor apagado"))),
        )));
        let out = system.process_command("sonido explosion").unwrap();
        assert!(!out.executed);
        assert!(out.rendered);
    }

    #[test]
    fn handler_errors_are_structured_failures() {
        let mut system = system_with("custom");
        let err = system
            .process_command("rotar jugador 99999999999999999999 grados")
            .unwrap_err();
        match err {
            CommandError::Handler { action, category, message } => {
                assert_eq!(action, Action::RotateObject);
                assert_eq!(category, "movement");
                assert!(message.contains("inválido"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(system.history().is_empty());
    }

    #[test]
    fn music_loop_flag_comes_from_the_matched_text() {
        let mut system = system_with("custom");
        let out = system.process_command("musica fondo loop").unwrap();
        assert!(out.description.contains("en bucle"));
        let out = system.process_command("música fondo").unwrap();
        assert!(!out.description.contains("en bucle"));
    }

    #[test]
    fn stubs_are_flagged_but_still_succeed() {
        let mut system = system_with("kaplay");
        let out = system.process_command("saltar jugador").unwrap();
        assert!(!out.rendered);
        assert!(out.code.contains("jumpObject"));
        assert_eq!(system.history().len(), 1);
    }

    #[test]
    fn generic_engine_for_unknown_names() {
        let mut system = system_with("phaser");
        let out = system.process_command("gravedad jugador").unwrap();
        assert!(out.rendered);
        assert!(out.code.starts_with("// addGravity({"));
        assert!(out.code.contains("\"name\":\"jugador\""));
    }

    #[test]
    fn history_records_commands_in_order() {
        let mut system = system_with("custom");
        system.process_command("crear jugador en 10,20").unwrap();
        system.process_command("mover jugador a 30,40").unwrap();
        let history = system.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].action, Action::CreateObject);
        assert_eq!(history[0].input, "crear jugador en 10,20");
        assert_eq!(history[1].action, Action::MoveObject);
        assert!(history[0].timestamp <= history[1].timestamp);
    }

    #[test]
    fn export_snapshots_history_and_variables() {
        let mut system = system_with("custom");
        system.process_command("variable vidas = 3").unwrap();
        let snapshot = system.export_commands();
        assert_eq!(snapshot.history.len(), 1);
        assert_eq!(snapshot.variables.get("vidas"), Some(&3));

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["history"][0]["action"], "setVariable");
        assert_eq!(json["variables"]["vidas"], 3);
    }

    #[test]
    fn accented_input_matches_plain_patterns() {
        let mut system = system_with("custom");
        let out = system.process_command("  POSICIÓN jugador   50,60 ").unwrap();
        assert_eq!(out.action, Action::SetPosition);
        assert!(out.code.contains("setPosition(50, 60)"));
    }

    #[test]
    fn suggestion_prefers_overlapping_examples() {
        assert!(suggestion_for("mover la nave").contains("mover jugador a 300,400"));
        assert!(suggestion_for("zzz qqq").contains("Intenta comandos"));
    }
}
