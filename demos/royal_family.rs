use family_sugiyama::{from_graph, FamilyTree, LayoutError, Person, PersonId};

const CELL_WIDTH: usize = 12;

fn add(tree: &mut FamilyTree, name: &str, title: &str, years: (&str, &str)) -> PersonId {
    let id = tree.next_id();
    tree.add_member(
        Person::new(id)
            .with_name(name)
            .with_title(title)
            .with_region("Aldoria")
            .with_house("Varn")
            .with_years(years.0, years.1),
    );
    id
}

fn main() -> Result<(), LayoutError> {
    let mut tree = FamilyTree::new();

    let edric = add(&mut tree, "Edric", "King", ("1102", "1160"));
    let mathilde = add(&mut tree, "Mathilde", "Queen", ("1108", "1171"));
    let oswin = add(&mut tree, "Oswin", "King", ("1130", "1188"));
    let agnes = add(&mut tree, "Agnes", "Princess", ("1133", "1190"));
    let rowena = add(&mut tree, "Rowena", "Queen", ("1135", "1180"));
    let bertrand = add(&mut tree, "Bertrand", "Duke", ("1129", "1175"));
    let aldous = add(&mut tree, "Aldous", "King", ("1160", "1210"));
    let isolde = add(&mut tree, "Isolde", "Lady", ("1163", ""));
    let cedric = add(&mut tree, "Cedric", "Prince", ("1165", ""));
    let wilmot = add(&mut tree, "Wilmot", "Lord", ("1158", ""));
    let helena = add(&mut tree, "Helena", "Princess", ("1190", ""));

    tree.marry(edric, mathilde);
    tree.set_parents(oswin, edric, mathilde);
    tree.set_parents(agnes, edric, mathilde);

    tree.marry(oswin, rowena);
    tree.marry(agnes, bertrand);
    tree.set_parents(aldous, oswin, rowena);
    tree.set_parents(cedric, oswin, rowena);
    tree.set_parents(isolde, agnes, bertrand);

    tree.marry(aldous, isolde);
    tree.partner(aldous, wilmot);
    tree.set_parents(helena, aldous, isolde);

    if let Some(monarch) = tree.member_mut(edric) {
        monarch.is_monarch = true;
    }

    let layout = from_graph(&tree).unit_spacing(1).build()?;

    let mut grid = vec![vec![String::new(); layout.width]; layout.height];
    for (id, (x, y)) in &layout.coordinates {
        if let Some(person) = tree.member(*id) {
            grid[*y as usize][*x as usize] = person.name.clone();
        }
    }
    for row in grid {
        let line = row
            .iter()
            .map(|name| format!("{name:^width$}", width = CELL_WIDTH))
            .collect::<String>();
        println!("{}", line.trim_end());
    }

    println!();
    for (id, (x, y)) in &layout.coordinates {
        if let Some(person) = tree.member(*id) {
            println!("({x}, {y}) {}", person.to_string().replace('\n', ", "));
        }
    }
    Ok(())
}
