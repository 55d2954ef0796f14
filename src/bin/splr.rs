// CDCL SAT solver CLI: reads a DIMACS CNF file, runs the solver, and
// prints/saves the result.
use {
    cdcl_sat::{
        config::{Config, VERSION},
        proof::CertificationIF,
        solver::{SatSolverIF, Solver},
        types::{Certificate, CNFDescription, SolverError, SolverResult},
    },
    std::{
        fs::File,
        io::{self, BufRead, BufReader, BufWriter, Write},
        path::PathBuf,
        process,
    },
    structopt::StructOpt,
};

fn main() {
    let config = Config::from_args();
    let (cnf, clauses) = match load_cnf(&config.cnf_filename) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("failed to read {}: {}", config.cnf_filename.display(), e);
            process::exit(1);
        }
    };
    let mut solver = Solver::build(&config, &cnf);
    for lits in &clauses {
        if let Err(e) = solver.add_clause(lits) {
            if e != SolverError::EmptyClause {
                eprintln!("invalid input clause: {}", e);
                process::exit(1);
            }
            break;
        }
    }
    let result = solver.solve();
    if !config.quiet_mode {
        solver
            .state
            .progress(&solver.asg, &solver.cdb, solver.elim.num_eliminated(), Some("done"));
    }
    if let Err(e) = save_result(&solver, &result, &config) {
        eprintln!("failed to write result: {}", e);
    }
    process::exit(match result {
        Ok(Certificate::SAT(_)) => 10,
        Ok(Certificate::UNSAT) => 20,
        Err(_) => 0,
    });
}

/// Read a DIMACS CNF file (or stdin, if the path is `-`): skip `c`/`p`
/// lines, split on whitespace, terminate each clause at its `0`. Parsing
/// is the binary's job -- the library only accepts already-split clauses
/// through `add_clause`.
fn load_cnf(path: &PathBuf) -> io::Result<(CNFDescription, Vec<Vec<i32>>)> {
    let reader: Box<dyn BufRead> = if path.to_string_lossy() == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        Box::new(BufReader::new(File::open(path)?))
    };
    let mut cnf = CNFDescription {
        pathname: path.to_string_lossy().into_owned(),
        ..CNFDescription::default()
    };
    let mut clauses = Vec::new();
    let mut current: Vec<i32> = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('c') {
            continue;
        }
        if let Some(rest) = line.strip_prefix('p') {
            let mut it = rest.split_whitespace();
            let _fmt = it.next();
            cnf.num_of_variables = it.next().and_then(|s| s.parse().ok()).unwrap_or(0);
            cnf.num_of_clauses = it.next().and_then(|s| s.parse().ok()).unwrap_or(0);
            continue;
        }
        for tok in line.split_whitespace() {
            match tok.parse::<i32>() {
                Ok(0) => clauses.push(std::mem::take(&mut current)),
                Ok(x) => current.push(x),
                Err(_) => continue,
            }
        }
    }
    if !current.is_empty() {
        clauses.push(current);
    }
    Ok((cnf, clauses))
}

fn save_result(solver: &Solver, result: &SolverResult, config: &Config) -> io::Result<()> {
    let mut out: Box<dyn Write> = match config.result_filename.to_string_lossy().as_ref() {
        "" | "-" => Box::new(BufWriter::new(io::stdout())),
        _ => Box::new(BufWriter::new(File::create(&config.result_filename)?)),
    };
    writeln!(
        out,
        "c an assignment set generated by cdcl-sat-{} for {}",
        VERSION,
        config.cnf_filename.display()
    )?;
    match result {
        Ok(Certificate::SAT(model)) => {
            writeln!(out, "s SATISFIABLE")?;
            for x in model {
                write!(out, "{} ", x)?;
            }
            writeln!(out, "0")?;
        }
        Ok(Certificate::UNSAT) => {
            writeln!(out, "s UNSATISFIABLE")?;
            writeln!(out, "0")?;
            if config.use_certification {
                let mut proof = BufWriter::new(File::create(&config.proof_filename)?);
                writeln!(proof, "s UNSATISFIABLE")?;
                proof.write_all(solver.cdb.certifier.to_text().as_bytes())?;
            }
        }
        Err(e) => {
            writeln!(out, "c {}", e)?;
            writeln!(out, "0")?;
        }
    }
    Ok(())
}
