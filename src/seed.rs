// src/seed.rs

use crate::{
    common::error::AppError,
    config::AppState,
    models::{company::NewCompany, person::NewPerson},
    services::person_service::PersonService,
};

const DEMO_PASSWORD: &str = "123456";

// (nome, cnpj, endereço)
const COMPANIES: &[(&str, &str, &str)] = &[
    ("Tech Solutions Brasil", "12345678000190", "Av. Paulista, 1000 - Sao Paulo, SP"),
    ("Comercio Digital Ltda", "98765432000111", "Rua das Flores, 250 - Rio de Janeiro, RJ"),
    ("Servicos Administrativos SA", "11223344000155", "Av. Brasil, 500 - Belo Horizonte, MG"),
];

struct DemoPerson {
    login: &'static str,
    name: &'static str,
    cpf: &'static str,
    email: &'static str,
    address: &'static str,
    // Posições em COMPANIES
    companies: &'static [usize],
}

const fn person(
    login: &'static str,
    name: &'static str,
    cpf: &'static str,
    email: &'static str,
    address: &'static str,
    companies: &'static [usize],
) -> DemoPerson {
    DemoPerson { login, name, cpf, email, address, companies }
}

const EMPLOYEES: &[DemoPerson] = &[
    person("jsilva", "Joao Silva", "12345678901", "joao.silva@email.com", "Rua A, 123 - Sao Paulo, SP", &[0]),
    person("msantos", "Maria Santos", "23456789012", "maria.santos@email.com", "Rua B, 456 - Sao Paulo, SP", &[0]),
    person("poliveira", "Pedro Oliveira", "34567890123", "pedro.oliveira@email.com", "Av. Central, 789 - Rio de Janeiro, RJ", &[0, 1]),
    person("acosta", "Ana Costa", "45678901234", "ana.costa@email.com", "Rua C, 321 - Rio de Janeiro, RJ", &[1]),
    person("rferreira", "Ricardo Ferreira", "56789012345", "ricardo.ferreira@email.com", "Rua D, 654 - Belo Horizonte, MG", &[1, 2]),
    person("lalmeida", "Lucia Almeida", "67890123456", "lucia.almeida@email.com", "Av. Afonso Pena, 987 - Belo Horizonte, MG", &[2]),
    person("crocha", "Carlos Rocha", "78901234567", "carlos.rocha@email.com", "Rua E, 159 - Sao Paulo, SP", &[0]),
    person("jlima", "Julia Lima", "89012345678", "julia.lima@email.com", "Rua F, 753 - Rio de Janeiro, RJ", &[1]),
    person("fmartins", "Fernando Martins", "90123456789", "fernando.martins@email.com", "Av. Amazonas, 951 - Belo Horizonte, MG", &[2]),
    person("pcarvalho", "Patricia Carvalho", "01234567890", "patricia.carvalho@email.com", "Rua G, 357 - Sao Paulo, SP", &[0, 2]),
    person(
        "bry",
        "Bry Tecnologia S.A",
        "10987654321",
        "bry@example.com",
        "Rua Lauro Linhares, 2010, torre B 8º andar, Trindade - 88036-002 Florianópolis-SC",
        &[0, 2],
    ),
];

const CUSTOMERS: &[DemoPerson] = &[
    person("rsousa", "Roberto Sousa", "11122233344", "roberto.sousa@email.com", "Rua das Palmeiras, 100 - Sao Paulo, SP", &[0]),
    person("apereira", "Amanda Pereira", "22233344455", "amanda.pereira@email.com", "Av. Atlantica, 200 - Rio de Janeiro, RJ", &[0]),
    person("bgomes", "Bruno Gomes", "33344455566", "bruno.gomes@email.com", "Rua Sete de Setembro, 300 - Belo Horizonte, MG", &[0]),
    person("cdias", "Camila Dias", "44455566677", "camila.dias@email.com", "Rua XV de Novembro, 400 - Sao Paulo, SP", &[1]),
    person("dribeiro", "Diego Ribeiro", "55566677788", "diego.ribeiro@email.com", "Av. Copacabana, 500 - Rio de Janeiro, RJ", &[1]),
    person("emoraes", "Eliane Moraes", "66677788899", "eliane.moraes@email.com", "Rua da Bahia, 600 - Belo Horizonte, MG", &[1]),
    person("falves", "Fabio Alves", "77788899900", "fabio.alves@email.com", "Rua Augusta, 700 - Sao Paulo, SP", &[1]),
    person("gnunes", "Gabriela Nunes", "88899900011", "gabriela.nunes@email.com", "Av. Vieira Souto, 800 - Rio de Janeiro, RJ", &[0, 1]),
    person("hcampos", "Henrique Campos", "99900011122", "henrique.campos@email.com", "Rua Rio Grande do Sul, 900 - Belo Horizonte, MG", &[2]),
    person("imonteiro", "Isabela Monteiro", "10011122233", "isabela.monteiro@email.com", "Av. Faria Lima, 1000 - Sao Paulo, SP", &[2]),
    person("jbarros", "Jorge Barros", "20022233344", "jorge.barros@email.com", "Rua Barao de Ipanema, 1100 - Rio de Janeiro, RJ", &[2]),
    person("kteixeira", "Karina Teixeira", "30033344455", "karina.teixeira@email.com", "Av. Assis Brasil, 1200 - Belo Horizonte, MG", &[0, 2]),
    person("lmiranda", "Leonardo Miranda", "40044455566", "leonardo.miranda@email.com", "Rua Oscar Freire, 1300 - Sao Paulo, SP", &[1, 2]),
    person(
        "mfonseca",
        "Mariana Fonseca",
        "50055566677",
        "mariana.fonseca@email.com",
        "Av. Nossa Senhora de Copacabana, 1400 - Rio de Janeiro, RJ",
        &[0, 1, 2],
    ),
    person("naraujo", "Nicolas Araujo", "60066677788", "nicolas.araujo@email.com", "Rua Parana, 1500 - Belo Horizonte, MG", &[1]),
];

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub companies: usize,
    pub employees: usize,
    pub customers: usize,
}

/// Popula um banco vazio com os dados de demonstração. Não faz nada se já houver empresas.
pub async fn seed_demo_data(state: &AppState) -> Result<SeedReport, AppError> {
    if state.companies.count().await? > 0 {
        tracing::info!("🌱 Banco já populado, seed ignorado.");
        return Ok(SeedReport::default());
    }

    let mut company_ids = Vec::with_capacity(COMPANIES.len());
    for (name, cnpj, address) in COMPANIES {
        let company = state
            .companies
            .create(NewCompany {
                name: (*name).into(),
                cnpj: (*cnpj).into(),
                address: (*address).into(),
                ..Default::default()
            })
            .await?;
        company_ids.push(company.company.id);
    }

    let employees = seed_people(&state.employees, EMPLOYEES, &company_ids).await?;
    let customers = seed_people(&state.customers, CUSTOMERS, &company_ids).await?;

    let report = SeedReport {
        companies: company_ids.len(),
        employees,
        customers,
    };
    tracing::info!(
        "🌱 Seed concluído: {} empresas, {} funcionários, {} clientes",
        report.companies,
        report.employees,
        report.customers
    );
    Ok(report)
}

async fn seed_people(service: &PersonService, people: &[DemoPerson], company_ids: &[i64]) -> Result<usize, AppError> {
    for demo in people {
        let linked = demo.companies.iter().filter_map(|idx| company_ids.get(*idx).copied()).collect();
        service
            .create(
                NewPerson {
                    login: demo.login.into(),
                    name: demo.name.into(),
                    cpf: demo.cpf.into(),
                    email: demo.email.into(),
                    address: demo.address.into(),
                    password: DEMO_PASSWORD.into(),
                    company_ids: Some(linked),
                },
                None,
            )
            .await?;
    }
    Ok(people.len())
}
