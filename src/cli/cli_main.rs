use crate::Rebalancing::auto_adjust::AdjustmentReport;
use crate::Utils::load_from_file::{load_task_from_file, load_task_from_str};
use crate::errors::PhAdjustError;
use log::{error, info};
use std::io::{self, BufRead, Write};

/// Small model shipped with the binary: ATP hydrolysis, acetate symport and an ABC transporter
/// between cytosol and periplasm. No proton is declared in the periplasm, one is added.
pub const DEMO_TASK: &str = r#"{
    "model": {
        "id": "demo",
        "compartments": ["c", "p"],
        "metabolites": [
            {"id": "atp[c]", "formula": "C10H12N5O13P3", "charge": -4},
            {"id": "h2o[c]", "formula": "H2O", "charge": 0},
            {"id": "adp[c]", "formula": "C10H12N5O10P2", "charge": -3},
            {"id": "pi[c]", "formula": "HO4P", "charge": -2},
            {"id": "h[c]", "formula": "H", "charge": 1},
            {"id": "ac[c]", "formula": "C2H3O2", "charge": -1},
            {"id": "ac[p]", "formula": "C2H3O2", "charge": -1},
            {"id": "glc__D[p]", "formula": "C6H12O6", "charge": 0},
            {"id": "glc__D[c]", "formula": "C6H12O6", "charge": 0}
        ],
        "reactions": [
            {"id": "ATPM", "metabolites": {"atp[c]": -1, "h2o[c]": -1, "adp[c]": 1, "pi[c]": 1, "h[c]": 1}},
            {"id": "ACtpp", "metabolites": {"ac[p]": -1, "ac[c]": 1}},
            {"id": "GLCabcpp", "metabolites": {"atp[c]": -1, "h2o[c]": -1, "glc__D[p]": -1, "adp[c]": 1, "pi[c]": 1, "h[c]": 1, "glc__D[c]": 1}},
            {"id": "EX_glc__D", "metabolites": {"glc__D[p]": -1}}
        ]
    },
    "pka": {"atp": [12.3, 6.5, 4.0], "ac": [4.76]},
    "settings": {"target_ph": {"c": 7.0, "p": 4.5}},
    "direction_override": []
}"#;

/// Runs a task file given on the command line, or the interactive menu without arguments.
pub fn run_cli(args: &[String]) -> Result<(), PhAdjustError> {
    match args.get(1) {
        Some(path) => run_task_file(path).map(|_| ()),
        None => run_interactive_menu(),
    }
}

pub fn run_task_file(path: &str) -> Result<AdjustmentReport, PhAdjustError> {
    let mut task = load_task_from_file(path)?;
    log::set_max_level(task.settings.level_filter());
    let report = task.solve()?;
    report.pretty_print();
    Ok(report)
}

pub fn run_demo() -> Result<AdjustmentReport, PhAdjustError> {
    let mut task = load_task_from_str(DEMO_TASK)?;
    info!("running the built-in demo task");
    let report = task.solve()?;
    report.pretty_print();
    Ok(report)
}

pub fn run_interactive_menu() -> Result<(), PhAdjustError> {
    run_menu(&mut io::stdin().lock())
}

/// Menu loop over any line source; ends on "0" or when the input is exhausted.
pub fn run_menu<R: BufRead>(input: &mut R) -> Result<(), PhAdjustError> {
    loop {
        show_main_menu()?;
        let Some(choice) = get_user_input(input)? else {
            println!();
            break;
        };

        let outcome = match choice.trim() {
            "1" => {
                print!("\x1b[36mPath to the task file: \x1b[0m");
                io::stdout().flush()?;
                let Some(path) = get_user_input(input)? else {
                    println!();
                    break;
                };
                run_task_file(path.trim()).map(|_| ())
            }
            "2" => run_demo().map(|_| ()),
            "0" => {
                println!("Goodbye!");
                break;
            }
            _ => {
                println!("Invalid choice. Please try again.");
                Ok(())
            }
        };
        // a failed task does not end the session
        if let Err(e) = outcome {
            error!("{}", e);
        }
    }
    Ok(())
}

/* colors
Blue (\x1b[34m) - Welcome header text

Yellow (\x1b[33m) - Menu options (1, 2, 0)

Cyan (\x1b[36m) - prompts

Reset (\x1b[0m) - Returns to normal color after each colored section
*/
fn show_main_menu() -> Result<(), PhAdjustError> {
    println!(
        "\x1b[34m\n PhBalance: protonation states and proton balance of metabolic models \n \x1b[0m"
    );
    println!("\x1b[33m1. Adjust model from task file\x1b[0m");
    println!("\x1b[33m2. Run demo task\x1b[0m");
    println!("\x1b[33m0. Exit\x1b[0m");
    print!("\x1b[36mEnter your choice: \x1b[0m");
    io::stdout().flush()?;
    Ok(())
}

/// one line of input, `None` at end of input
fn get_user_input<R: BufRead>(reader: &mut R) -> Result<Option<String>, PhAdjustError> {
    let mut input = String::new();
    if reader.read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rebalancing::topology::ReactionTopology;
    use std::io::Cursor;

    #[test]
    fn test_demo_task() {
        let report = run_demo().unwrap();
        assert_eq!(report.synthesized_protons, vec!["h[p]"]);
        assert_eq!(report.classifications[1].topology, ReactionTopology::Symport);
        assert_eq!(report.classifications[2].topology, ReactionTopology::Abc);
        assert_eq!(report.classifications[3].topology, ReactionTopology::Exchange);
        assert_eq!(report.fallback_formulas().len(), 0);
        assert!(report.unresolved_reactions.is_empty());
    }

    #[test]
    fn test_menu_ends_at_end_of_input() {
        let mut empty = Cursor::new(Vec::new());
        assert!(run_menu(&mut empty).is_ok());
        // invalid choice and a failing path, then the input runs out at the path prompt
        let mut lines = Cursor::new(b"7\n1\nmissing.json\n1\n".to_vec());
        assert!(run_menu(&mut lines).is_ok());
    }

    #[test]
    fn test_user_input_lines() {
        let mut lines = Cursor::new(b"2\n0".to_vec());
        assert_eq!(get_user_input(&mut lines).unwrap().as_deref(), Some("2\n"));
        assert_eq!(get_user_input(&mut lines).unwrap().as_deref(), Some("0"));
        assert_eq!(get_user_input(&mut lines).unwrap(), None);
    }

    #[test]
    fn test_missing_task_file() {
        assert!(run_cli(&["phbalance".to_string(), "missing.json".to_string()]).is_err());
    }
}
