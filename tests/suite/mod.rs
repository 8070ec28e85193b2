mod catalog_cli;
mod simulate_cli;
mod simulation;
