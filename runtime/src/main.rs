use wafer::utils::{disassemble, generate_demo_program};
use wafer::{Machine, MachineConfig, Registry, VERSION};

fn main() {
    println!("Wafer Stack Machine v{}", VERSION);

    let program = generate_demo_program();
    println!("\n{}", disassemble(&program));

    let config = MachineConfig::default().with_trace(true);
    let mut machine = Machine::with_config(program, Registry::with_builtins(), config);

    match machine.run() {
        Ok(Some(result)) => println!("Execution completed with result: {}", result),
        Ok(None) => println!("Execution completed with an empty stack"),
        Err(e) => eprintln!("Execution failed: {}", e),
    }

    let mut variables: Vec<_> = machine.environment().iter().collect();
    variables.sort_by(|a, b| a.0.cmp(b.0));
    for (name, value) in variables {
        println!("{} = {}", name, value);
    }
}
