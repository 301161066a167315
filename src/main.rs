mod catalog;
mod codegen;
mod engine;
mod interpreter;
mod lookups;
mod normalize;

use anyhow::Result;
use arc_swap::ArcSwap;
use notify::{RecursiveMode, Watcher, recommended_watcher};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use engine::EngineDescriptor;
use interpreter::{CommandError, KeywordSystem};
use normalize::apply_aliases;

/// Configuration for the command interpreter
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    /// Engine the generated code targets: "kaplay", "custom", or any other
    /// name (unknown names get the generic renderer). Empty = none selected.
    pub engine: String,
    pub quiet: bool,
    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: "custom".to_string(),
            quiet: false,
            aliases: HashMap::new(),
        }
    }
}

impl Config {
    pub fn load() -> (Self, Option<PathBuf>) {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("palabras").join("config.toml")),
            dirs::home_dir().map(|p| p.join(".palabras").join("config.toml")),
            Some(PathBuf::from("config.toml")),
        ];

        for path in config_paths.into_iter().flatten() {
            if path.exists() {
                if let Ok(contents) = fs::read_to_string(&path) {
                    match toml::from_str(&contents) {
                        Ok(config) => {
                            println!("[PALABRAS] Configuración cargada de: {:?}", path);
                            return (config, Some(path));
                        }
                        Err(e) => {
                            eprintln!("[PALABRAS] Error en la configuración {:?}: {}", path, e);
                        }
                    }
                }
            }
        }

        // No config found - create one at the default location
        if let Some(config_dir) = dirs::config_dir() {
            let app_dir = config_dir.join("palabras");
            let config_path = app_dir.join("config.toml");

            if let Err(e) = fs::create_dir_all(&app_dir) {
                eprintln!("[PALABRAS] No se pudo crear el directorio de configuración: {}", e);
            } else if let Err(e) = fs::write(&config_path, Self::default_config_content()) {
                eprintln!("[PALABRAS] No se pudo escribir la configuración por defecto: {}", e);
            } else {
                println!("[PALABRAS] Configuración por defecto creada en: {:?}", config_path);
                return (Self::default(), Some(config_path));
            }
        }

        println!("[PALABRAS] Usando configuración por defecto");
        (Self::default(), None)
    }

    fn default_config_content() -> &'static str {
        r##"# Configuración de Palabras
# Edita este archivo para personalizar el intérprete.
# Los cambios se recargan en caliente - no hace falta reiniciar.

# Motor gráfico para el código generado: "kaplay", "custom" (motor propio
# offline) o cualquier otro nombre (genera comentarios genéricos).
# Deja vacío para no seleccionar ningún motor.
engine = "custom"

# Mostrar solo el código generado, sin descripciones
quiet = false

# Alias para frases habituales o errores de tipeo
# Se aplican antes de interpretar el comando
[aliases]
# "meter" = "crear"
# "pintar" = "color"
"##
    }

    pub fn load_from(path: &PathBuf) -> Option<Self> {
        if let Ok(contents) = fs::read_to_string(path) {
            match toml::from_str(&contents) {
                Ok(config) => Some(config),
                Err(e) => {
                    eprintln!("[PALABRAS] Error al recargar la configuración: {}", e);
                    None
                }
            }
        } else {
            None
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let (config, config_path) = Config::load();

    println!("=================================");
    println!("   Palabras v0.3.0");
    println!("   Comandos en español → código");
    println!("=================================");
    print_help();

    let mut system = KeywordSystem::new()?;
    let mut applied_engine = config.engine.clone();
    if !config.engine.is_empty() {
        system.set_current_engine(Some(EngineDescriptor::named(config.engine.clone())));
        println!("[PALABRAS] Motor activo: {}", config.engine);
    } else {
        println!("[PALABRAS] Sin motor seleccionado (usa :motor <nombre>)");
    }
    if !config.aliases.is_empty() {
        println!("[PALABRAS] Alias: {} cargados", config.aliases.len());
    }

    let config = Arc::new(ArcSwap::from_pointee(config));

    // Config hot-reload: watch the file and swap the shared config
    if let Some(ref path) = config_path {
        let config_for_watcher = config.clone();
        let watch_path = path.clone();
        std::thread::spawn(move || {
            let (tx, rx) = std::sync::mpsc::channel();
            let mut watcher = match recommended_watcher(tx) {
                Ok(w) => w,
                Err(e) => {
                    eprintln!("[PALABRAS] No se pudo crear el observador de configuración: {}", e);
                    return;
                }
            };
            if let Err(e) = watcher.watch(&watch_path, RecursiveMode::NonRecursive) {
                eprintln!("[PALABRAS] No se pudo observar la configuración: {}", e);
                return;
            }
            tracing::debug!("observando {:?}", watch_path);

            for event in rx {
                if let Ok(event) = event {
                    if event.kind.is_modify() {
                        std::thread::sleep(Duration::from_millis(100));
                        if let Some(new_config) = Config::load_from(&watch_path) {
                            config_for_watcher.store(Arc::new(new_config));
                            println!("[PALABRAS] 🔄 Configuración recargada");
                        }
                    }
                }
            }
        });
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let cfg = config.load();

        // Engine changes from the config file take effect between commands
        if cfg.engine != applied_engine {
            applied_engine = cfg.engine.clone();
            if applied_engine.is_empty() {
                system.set_current_engine(None);
                println!("[PALABRAS] Motor deseleccionado");
            } else {
                system.set_current_engine(Some(EngineDescriptor::named(applied_engine.clone())));
                println!("[PALABRAS] Motor activo: {}", applied_engine);
            }
        }

        if let Some(meta) = line.strip_prefix(':') {
            if !run_meta_command(&mut system, meta) {
                break;
            }
            continue;
        }

        let aliased = apply_aliases(line, &cfg.aliases);
        match system.process_command(&aliased) {
            Ok(out) => {
                if !cfg.quiet {
                    println!("[PALABRAS] ✅ {} ({}/{})", out.description, out.category, out.action);
                }
                println!("{}", out.code);
                if !cfg.quiet {
                    if !out.rendered {
                        println!("[PALABRAS] ⚠️ Acción sin plantilla para este motor");
                    }
                    if out.executed {
                        println!("[PALABRAS] ▶️ Ejecutado en el motor");
                    }
                }
            }
            Err(CommandError::NotRecognized { suggestion }) => {
                eprintln!("[PALABRAS] ❌ Comando no reconocido");
                eprintln!("[PALABRAS] 💡 {}", suggestion);
            }
            Err(e @ CommandError::NoEngine) => {
                eprintln!("[PALABRAS] ❌ {}", e);
                eprintln!("[PALABRAS] 💡 Selecciona uno con :motor kaplay o :motor custom");
            }
            Err(e @ CommandError::Handler { .. }) => {
                eprintln!("[PALABRAS] ❌ {}", e);
            }
        }
    }

    println!("[PALABRAS] 👋 Hasta luego");
    Ok(())
}

/// Run a `:meta` command. Returns false when the session should end.
fn run_meta_command(system: &mut KeywordSystem, meta: &str) -> bool {
    let mut parts = meta.trim().splitn(2, ' ');
    let command = parts.next().unwrap_or("");
    let arg = parts.next().map(str::trim).unwrap_or("");

    match command {
        "ayuda" | "help" => {
            if arg.is_empty() {
                print_help();
            } else {
                match system.command_help(arg) {
                    Some(help) => {
                        println!("[PALABRAS] {} ({})", help.action, help.category);
                        println!("    patrón:  {}", help.pattern);
                        println!("    ejemplo: {}", help.example);
                    }
                    None => eprintln!("[PALABRAS] ⚠️ Acción desconocida: {}", arg),
                }
            }
        }
        "comandos" => {
            for info in system.available_commands() {
                println!("{:<12} {:<20} {}", info.category, info.action.as_str(), info.example);
            }
        }
        "categoria" => {
            let commands = system.commands_by_category(arg);
            if commands.is_empty() {
                eprintln!("[PALABRAS] ⚠️ Categoría desconocida: {}", arg);
            }
            for info in commands {
                println!("{:<20} {}", info.action.as_str(), info.pattern);
            }
        }
        "buscar" => {
            let results = system.search_commands(arg);
            if results.is_empty() {
                println!("[PALABRAS] Sin resultados para \"{}\"", arg);
            }
            for info in results {
                println!("{:<12} {:<20} {}", info.category, info.action.as_str(), info.example);
            }
        }
        "historial" => {
            if system.history().is_empty() {
                println!("[PALABRAS] Historial vacío");
            }
            for entry in system.history() {
                let mark = if entry.executed { "▶️" } else { "·" };
                println!("{} {} — {}", mark, entry.input, entry.description);
            }
        }
        "exportar" => match serde_json::to_string_pretty(&system.export_commands()) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("[PALABRAS] ❌ Error al exportar: {}", e),
        },
        "limpiar" => {
            system.clear_history();
            println!("[PALABRAS] 🧹 Historial y variables borrados");
        }
        "motor" => {
            if arg.is_empty() {
                match system.current_engine_name() {
                    Some(name) => println!("[PALABRAS] Motor actual: {}", name),
                    None => println!("[PALABRAS] Sin motor seleccionado"),
                }
            } else {
                system.set_current_engine(Some(EngineDescriptor::named(arg)));
                println!("[PALABRAS] Motor activo: {}", arg);
            }
        }
        "salir" | "q" => return false,
        _ => eprintln!("[PALABRAS] ⚠️ Comando desconocido: :{} (prueba :ayuda)", command),
    }
    true
}

/// Print the help/command reference
fn print_help() {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                  Palabras — comandos en español              ║");
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!("║ Escribe un comando y se traduce a código del motor activo:   ║");
    println!("║   crear jugador en 100,200      mover jugador a 300,400      ║");
    println!("║   color jugador rojo            gravedad jugador             ║");
    println!("║   tecla espacio hacer saltar jugador                         ║");
    println!("║   cuando jugador toca moneda hacer sumar                     ║");
    println!("║   sonido explosion              ir a menu_principal          ║");
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!("║ Meta-comandos:                                               ║");
    println!("║   :comandos            lista todos los patrones              ║");
    println!("║   :categoria <nombre>  patrones de una categoría             ║");
    println!("║   :buscar <término>    busca por acción o categoría          ║");
    println!("║   :ayuda <acción>      ayuda de una acción concreta          ║");
    println!("║   :historial  :exportar  :limpiar                            ║");
    println!("║   :motor <nombre>      cambia el motor (kaplay/custom/…)     ║");
    println!("║   :salir               termina la sesión                     ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
}
