use anyhow::Result;
use colored::*;
use iflow_tools_core::Package;

use super::print_json;

/// Human readable package tree
pub fn format_packages(packages: &[Package]) -> String {
    let mut output = String::new();
    for package in packages {
        output.push_str(&format!(
            "{} ({} iFlow{})\n",
            package.id.bold(),
            package.iflows.len(),
            if package.iflows.len() == 1 { "" } else { "s" }
        ));
        for iflow in &package.iflows {
            output.push_str(&format!("  {}\n", iflow.id));
        }
    }
    output
}

/// Print discovered packages, as a tree or as JSON
pub fn print_packages(packages: &[Package], json: bool) -> Result<()> {
    if json {
        return print_json(packages);
    }
    if packages.is_empty() {
        eprintln!("{}", "No packages found.".yellow());
    } else {
        print!("{}", format_packages(packages));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use iflow_tools_core::IFlow;
    use std::path::PathBuf;

    #[test]
    fn test_format_packages() {
        colored::control::set_override(false);
        let packages = vec![
            Package {
                id: "Billing".to_string(),
                path: PathBuf::from("/p/Billing"),
                iflows: vec![IFlow {
                    id: "InvoiceSend".to_string(),
                    package_id: "Billing".to_string(),
                    path: PathBuf::from("/p/Billing/InvoiceSend"),
                }],
            },
            Package {
                id: "Empty".to_string(),
                path: PathBuf::from("/p/Empty"),
                iflows: Vec::new(),
            },
        ];

        assert_eq!(
            format_packages(&packages),
            "Billing (1 iFlow)\n  InvoiceSend\nEmpty (0 iFlows)\n"
        );
    }
}
