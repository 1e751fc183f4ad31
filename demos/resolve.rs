use mkchain::{ChainResolver, ResolutionOptions};

fn main() {
    let path = std::env::args().nth(1).expect("usage: resolve <leaf-cert>");
    let leaf = std::fs::read(&path).unwrap();

    // Keep the leaf so the output can be dropped straight into a server config.
    let options = ResolutionOptions {
        include_leaf: true,
        ..ResolutionOptions::default()
    };
    let resolver = ChainResolver::new(options);

    let chain = resolver.resolve(&leaf).unwrap();
    for cert in chain.certificates() {
        eprintln!("{} <- {}", cert.subject(), cert.issuer());
    }

    print!("{}", mkchain::assemble(chain, resolver.options()).unwrap());
}
