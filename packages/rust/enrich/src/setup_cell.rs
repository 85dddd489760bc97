//! Setup-cell source construction.

use crate::deps::ResolvedDeps;

/// Build the source lines of a cloud setup cell.
///
/// One `pip install` invocation covers every package; a commented block of
/// `wget` commands follows only when there are required files, each
/// fetching `<base_uri>/<relative path>`.
pub fn build_setup_source(deps: &ResolvedDeps, base_uri: &str) -> Vec<String> {
    let mut lines = vec![
        "# Execute this cell to install the notebook's requirements in this environment"
            .to_string(),
        format!("!pip install -q {}", deps.packages.join(" ")),
    ];

    if !deps.files.is_empty() {
        lines.push("# We also need to get a few files that the notebook depends on".to_string());
        lines.extend(
            deps.files
                .iter()
                .map(|file| format!("!wget -q '{base_uri}/{file}'")),
        );
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://example.com/cookbook";

    fn deps(packages: &[&str], files: &[&str]) -> ResolvedDeps {
        ResolvedDeps {
            packages: packages.iter().map(|s| s.to_string()).collect(),
            files: files.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn installs_all_packages_in_one_command() {
        let lines = build_setup_source(&deps(&["openmm", "mdtraj"], &[]), BASE);
        let installs: Vec<_> = lines.iter().filter(|l| l.contains("pip install")).collect();
        assert_eq!(installs.len(), 1);
        assert_eq!(installs[0], "!pip install -q openmm mdtraj");
    }

    #[test]
    fn no_files_means_no_fetch_lines() {
        let lines = build_setup_source(&deps(&["openmm"], &[]), BASE);
        assert!(lines.iter().all(|l| !l.contains("wget")));
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn one_fetch_line_per_file() {
        let files = ["villin.pdb", "data/traj.dcd"];
        let lines = build_setup_source(&deps(&["openmm"], &files), BASE);

        let wgets: Vec<_> = lines.iter().filter(|l| l.contains("wget")).collect();
        assert_eq!(wgets.len(), files.len());
        for (line, file) in wgets.iter().zip(files) {
            assert!(line.contains(BASE));
            assert!(line.contains(file));
        }
        // The fetch block is introduced by a comment line.
        assert!(lines[2].starts_with('#'));
    }
}
